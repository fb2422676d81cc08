//! Rechecks feasibility against a (possibly newer) balance snapshot and
//! ranks feasible opportunities deterministically.

use {
    alloy_primitives::U256,
    lbf_types::{
        decimal::{to_float, USDC_DECIMALS},
        Opportunity, ScoredOpportunity, TokenBalance, TokenKind,
    },
    std::collections::HashMap,
};

/// Gas cost is an unmodeled constant placeholder; bridge fees default to
/// zero for routes this system does not model pricing for.
const GAS_USD_PLACEHOLDER: f64 = 1.0;
const MIN_COST_FACTOR: f64 = 0.1;

#[derive(Clone, Copy, Debug)]
pub struct ScorerConfig {
    pub min_score: f64,
}

fn base_weight(opp: &Opportunity) -> f64 {
    match opp {
        Opportunity::FillDeficit { .. } => 200.0,
        Opportunity::TakeSurplus { .. } => 200.0,
        Opportunity::BridgeIou { .. } => 40.0,
    }
}

fn score_one(opp: Opportunity, balances: &HashMap<String, TokenBalance>) -> ScoredOpportunity {
    let mut reasons = Vec::new();
    let mut feasible = true;

    let balance_ok = match &opp {
        Opportunity::FillDeficit { to, amount } => {
            balances.get(to).map(|b| b.token(TokenKind::Usdc) >= *amount).unwrap_or(false)
        }
        Opportunity::TakeSurplus { on, amount } => {
            balances.get(on).map(|b| b.token(TokenKind::Iou) >= *amount).unwrap_or(false)
        }
        Opportunity::BridgeIou { from, amount, .. } => {
            balances.get(from).map(|b| b.token(TokenKind::Iou) >= *amount).unwrap_or(false)
        }
    };
    if !balance_ok {
        feasible = false;
        reasons.push("balance snapshot no longer covers the amount".to_string());
    }

    let gas_network = opp.gas_network();
    let has_gas = balances.get(gas_network).map(|b| b.native > U256::ZERO).unwrap_or(false);
    if !has_gas {
        feasible = false;
        reasons.push(format!("no native gas available on {gas_network}"));
    }

    let value_usd = to_float(opp.amount(), USDC_DECIMALS);
    let cost_usd = GAS_USD_PLACEHOLDER;
    let cost_factor = if value_usd > 0.0 {
        (1.0 - cost_usd / value_usd).max(MIN_COST_FACTOR)
    } else {
        MIN_COST_FACTOR
    };
    let score = base_weight(&opp) * cost_factor;

    ScoredOpportunity { opp, score, feasible, reasons }
}

/// Scores every opportunity, keeps only `feasible && score >= min_score`,
/// and sorts by descending score. Deterministic for a fixed input.
pub fn score(
    opportunities: Vec<Opportunity>,
    balances: &HashMap<String, TokenBalance>,
    config: &ScorerConfig,
) -> Vec<ScoredOpportunity> {
    let mut scored: Vec<ScoredOpportunity> = opportunities.into_iter().map(|opp| score_one(opp, balances)).collect();

    scored.retain(|s| s.feasible && s.score >= config.min_score);
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(usdc: u64, iou: u64, native: u64) -> TokenBalance {
        let mut b = TokenBalance { native: U256::from(native), tokens: Default::default() };
        b.set_token(TokenKind::Usdc, U256::from(usdc));
        b.set_token(TokenKind::Iou, U256::from(iou));
        b
    }

    #[test]
    fn infeasible_when_balance_shrank_since_discovery() {
        let balances = maplit::hashmap! { "A".to_string() => balance(100, 0, 1) };
        let opps = vec![Opportunity::FillDeficit { to: "A".to_string(), amount: U256::from(1_000u64) }];
        let scored = score(opps, &balances, &ScorerConfig { min_score: 0.0 });
        assert!(scored.is_empty());
    }

    #[test]
    fn infeasible_without_native_gas() {
        let balances = maplit::hashmap! { "A".to_string() => balance(10_000, 0, 0) };
        let opps = vec![Opportunity::FillDeficit { to: "A".to_string(), amount: U256::from(1_000u64) }];
        let scored = score(opps, &balances, &ScorerConfig { min_score: 0.0 });
        assert!(scored.is_empty());
    }

    #[test]
    fn sorted_descending_by_score() {
        let balances = maplit::hashmap! {
            "A".to_string() => balance(10_000_000, 0, 1),
            "B".to_string() => balance(0, 10_000_000, 1),
        };
        let opps = vec![
            Opportunity::FillDeficit { to: "A".to_string(), amount: U256::from(1_000_000u64) },
            Opportunity::BridgeIou { from: "B".to_string(), to: "A".to_string(), amount: U256::from(10u64) },
        ];
        let scored = score(opps, &balances, &ScorerConfig { min_score: 0.0 });
        assert_eq!(scored.len(), 2);
        assert!(scored[0].score >= scored[1].score);
        assert!(matches!(scored[0].opp, Opportunity::FillDeficit { .. }));
    }

    #[test]
    fn scoring_is_deterministic() {
        let balances = maplit::hashmap! { "A".to_string() => balance(10_000_000, 0, 1) };
        let opps = vec![Opportunity::FillDeficit { to: "A".to_string(), amount: U256::from(1_000_000u64) }];
        let first = score(opps.clone(), &balances, &ScorerConfig { min_score: 0.0 });
        let second = score(opps, &balances, &ScorerConfig { min_score: 0.0 });
        assert_eq!(first[0].score, second[0].score);
    }
}

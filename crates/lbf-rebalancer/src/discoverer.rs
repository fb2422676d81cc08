//! Enumerates candidate [`Opportunity`] values from the joint state of
//! pools and balances. Pure and deterministic for a fixed input, per spec
//! §4.5.1/§8.

use {
    alloy_primitives::U256,
    lbf_types::{Opportunity, PoolData, TokenBalance, TokenKind},
    std::collections::HashMap,
};

#[derive(Clone, Copy, Debug)]
pub struct DiscovererConfig {
    pub deficit_threshold: U256,
    pub surplus_threshold: U256,
}

/// Produces a (possibly empty) list of opportunities. `net_allowance` is the
/// net-exposure headroom computed once by the caller (§4.5.3); it caps every
/// `FillDeficit` amount independently, it is not decremented across the
/// opportunities returned by a single call.
pub fn discover(
    pool_data: &HashMap<String, PoolData>,
    balances: &HashMap<String, TokenBalance>,
    config: &DiscovererConfig,
    net_allowance: U256,
) -> Vec<Opportunity> {
    let mut networks: Vec<&String> = pool_data.keys().collect();
    networks.sort();

    let mut opportunities = Vec::new();

    for network in &networks {
        let pool = &pool_data[*network];
        let usdc = balance_of(balances, network, TokenKind::Usdc);
        if pool.deficit >= config.deficit_threshold && usdc > U256::ZERO {
            let amount = usdc.min(pool.deficit).min(net_allowance);
            if amount > U256::ZERO {
                opportunities.push(Opportunity::FillDeficit { to: (*network).clone(), amount });
            }
        }
    }

    for network in &networks {
        let pool = &pool_data[*network];
        let iou = balance_of(balances, network, TokenKind::Iou);
        if pool.surplus >= config.surplus_threshold && iou > U256::ZERO {
            let amount = iou.min(pool.surplus);
            if amount > U256::ZERO {
                opportunities.push(Opportunity::TakeSurplus { on: (*network).clone(), amount });
            }
        }
    }

    if let Some(destination) = bridge_destination(&networks, pool_data, config) {
        for network in &networks {
            if *network == destination {
                continue;
            }
            let pool = &pool_data[*network];
            let iou = balance_of(balances, network, TokenKind::Iou);
            let qualifies_locally = pool.deficit >= config.deficit_threshold || pool.surplus >= config.surplus_threshold;
            if iou > U256::ZERO && !qualifies_locally {
                opportunities.push(Opportunity::BridgeIou {
                    from: (*network).clone(),
                    to: destination.clone(),
                    amount: iou,
                });
            }
        }
    }

    opportunities
}

fn balance_of(balances: &HashMap<String, TokenBalance>, network: &str, kind: TokenKind) -> U256 {
    balances.get(network).map(|b| b.token(kind)).unwrap_or_default()
}

/// The network whose surplus is the strict maximum among those meeting
/// `surplus_threshold`. Ties break deterministically by lexicographically
/// smallest network name.
fn bridge_destination(
    networks: &[&String],
    pool_data: &HashMap<String, PoolData>,
    config: &DiscovererConfig,
) -> Option<String> {
    let mut best: Option<(&String, U256)> = None;
    for network in networks {
        let pool = &pool_data[*network];
        if pool.surplus < config.surplus_threshold {
            continue;
        }
        best = Some(match best {
            None => (*network, pool.surplus),
            Some((best_network, best_surplus)) => {
                if pool.surplus > best_surplus || (pool.surplus == best_surplus && *network < best_network) {
                    (*network, pool.surplus)
                } else {
                    (best_network, best_surplus)
                }
            }
        });
    }
    best.map(|(network, _)| network.clone())
}

use alloy_primitives::U256;

/// A candidate on-chain action produced by the discoverer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Opportunity {
    FillDeficit {
        to: String,
        amount: U256,
    },
    TakeSurplus {
        on: String,
        amount: U256,
    },
    BridgeIou {
        from: String,
        to: String,
        amount: U256,
    },
}

impl Opportunity {
    pub const fn kind(&self) -> &'static str {
        match self {
            Opportunity::FillDeficit { .. } => "fill_deficit",
            Opportunity::TakeSurplus { .. } => "take_surplus",
            Opportunity::BridgeIou { .. } => "bridge_iou",
        }
    }

    pub fn amount(&self) -> U256 {
        match self {
            Opportunity::FillDeficit { amount, .. }
            | Opportunity::TakeSurplus { amount, .. }
            | Opportunity::BridgeIou { amount, .. } => *amount,
        }
    }

    /// The network whose gas the executor must hold to submit this
    /// opportunity's transaction: `from` when present (bridges spend gas on
    /// the source chain), otherwise the opportunity's sole network.
    pub fn gas_network(&self) -> &str {
        match self {
            Opportunity::FillDeficit { to, .. } => to,
            Opportunity::TakeSurplus { on, .. } => on,
            Opportunity::BridgeIou { from, .. } => from,
        }
    }
}

/// An [`Opportunity`] annotated with its feasibility and score at the time
/// scoring ran. `reasons` records why an opportunity was marked infeasible,
/// for logging.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredOpportunity {
    pub opp: Opportunity,
    pub score: f64,
    pub feasible: bool,
    pub reasons: Vec<String>,
}

use alloy_primitives::U256;

/// A single pool-data reading, posted into the core inbox in source order
/// per network (distinct networks may interleave arbitrarily).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolUpdate {
    pub deficit: U256,
    pub surplus: U256,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolEvent {
    pub network: String,
    pub update: PoolUpdate,
}

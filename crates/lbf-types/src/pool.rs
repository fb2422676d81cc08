use {alloy_primitives::U256, std::time::Instant};

/// The latest `(deficit, surplus)` reading for a pool, plus when it was
/// observed. The observer never enforces a TTL itself; consumers compare
/// `last_updated` against their own staleness tolerance.
#[derive(Clone, Copy, Debug)]
pub struct PoolData {
    pub deficit: U256,
    pub surplus: U256,
    pub last_updated: Instant,
}

impl PoolData {
    pub fn new(deficit: U256, surplus: U256) -> Self {
        Self {
            deficit,
            surplus,
            last_updated: Instant::now(),
        }
    }
}

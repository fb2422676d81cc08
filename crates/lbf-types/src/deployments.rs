use {alloy_primitives::Address, std::collections::HashMap};

/// The unique pool that also acts as the redemption hub. Always present
/// after a successful [`crate::error::LbfError`]-free load, and its network
/// is always kept in the active set regardless of whitelist/blacklist
/// filters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentPool {
    pub network: String,
    pub address: Address,
}

/// A consistent snapshot of pool and token addresses across all networks,
/// produced by the `DeploymentCoordinator`. Handed out by value so readers
/// never hold a reference that would outlive the next refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deployments {
    pub pools: HashMap<String, Address>,
    pub parent_pool: Option<ParentPool>,
    pub usdc: HashMap<String, Address>,
    pub iou: HashMap<String, Address>,
}

impl Deployments {
    pub fn new() -> Self {
        Self::default()
    }

    /// The address of the pool contract for `network`: its own deployment if
    /// it has one, otherwise the parent pool's address if `network` is the
    /// parent's network.
    pub fn pool_address(&self, network: &str) -> Option<Address> {
        if let Some(addr) = self.pools.get(network) {
            return Some(*addr);
        }
        match &self.parent_pool {
            Some(parent) if parent.network == network => Some(parent.address),
            _ => None,
        }
    }

    /// Whether `network` has a pool deployment or is the parent pool's
    /// network — the membership test the network coordinator uses to decide
    /// the active set.
    pub fn has_pool(&self, network: &str) -> bool {
        self.pool_address(network).is_some()
    }
}

//! Candidate-network sources. `Mainnet`/`Testnet` modes consult an external
//! network registry (out of scope — specified only by this trait); the
//! `Localhost` mode uses a caller-provided static list instead.

use {
    async_trait::async_trait,
    lbf_types::{LbfError, Network, NetworkMode},
};

#[async_trait]
pub trait NetworkRegistry: Send + Sync {
    /// All candidate networks for `mode`. The coordinator further filters
    /// these by deployment presence and whitelist/blacklist.
    async fn candidate_networks(&self, mode: NetworkMode) -> Result<Vec<Network>, LbfError>;
}

/// A fixed list of networks, filtered by mode on each call. Used both for
/// `--network-mode localhost` and in tests.
#[derive(Clone, Debug, Default)]
pub struct StaticNetworkRegistry {
    networks: Vec<Network>,
}

impl StaticNetworkRegistry {
    pub fn new(networks: Vec<Network>) -> Self {
        Self { networks }
    }
}

#[async_trait]
impl NetworkRegistry for StaticNetworkRegistry {
    async fn candidate_networks(&self, mode: NetworkMode) -> Result<Vec<Network>, LbfError> {
        Ok(self
            .networks
            .iter()
            .filter(|network| network.mode == mode)
            .cloned()
            .collect())
    }
}

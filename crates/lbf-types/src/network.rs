use {serde::Deserialize, url::Url};

/// Which class of chain a [`Network`] belongs to. Drives which
/// `ManifestSource`s the deployment coordinator consults and whether the
/// network registry or a caller-provided static list supplies candidates.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    Mainnet,
    Testnet,
    Localhost,
}

/// A candidate chain the operator could be active on. `name` is the primary
/// key used throughout the system — balances, pool data, and deployments are
/// all keyed by it rather than by chain id.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    pub name: String,
    pub chain_id: u64,
    pub selector: String,
    pub mode: NetworkMode,
    pub rpc_urls: Vec<Url>,
}

impl Network {
    pub fn new(
        name: impl Into<String>,
        chain_id: u64,
        selector: impl Into<String>,
        mode: NetworkMode,
        rpc_urls: Vec<Url>,
    ) -> Self {
        Self {
            name: name.into(),
            chain_id,
            selector: selector.into(),
            mode,
            rpc_urls,
        }
    }
}

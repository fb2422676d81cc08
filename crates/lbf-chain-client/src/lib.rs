//! Trait surface for the system's three external collaborators: manifest
//! fetching, chain read/write access, and signer/address resolution. The
//! concrete HTTP fetcher, RPC transport, nonce allocation, and private-key
//! handling are intentionally not implemented here — only the interface the
//! core depends on, plus an in-memory `local` implementation suitable for
//! tests and `--network-mode localhost` runs.

pub mod local;

use {
    alloy_primitives::{Address, U256},
    async_trait::async_trait,
    lbf_types::LbfError,
    std::sync::Arc,
};

/// A transaction receipt as far as the core cares: just enough to log and to
/// gate subsequent steps on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub success: bool,
}

/// Fetches deployment manifests: one `(key, value, network_name)` triple per
/// recognized line. Key/value parsing (regex matching, hex decoding) is the
/// `DeploymentCoordinator`'s job, not the source's.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<(String, String, String)>, LbfError>;
}

/// Read/write primitives against one chain. A single `ChainClient` instance
/// is assumed to already be bound to one network — callers never pass a
/// chain id into its methods except where the pool ABI itself requires one
/// (`bridge_iou`'s destination chain).
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_pool_data(&self, pool: Address) -> Result<(U256, U256), LbfError>;
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, LbfError>;
    async fn native_balance_of(&self, owner: Address) -> Result<U256, LbfError>;
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LbfError>;
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxReceipt, LbfError>;
    async fn fill_deficit(
        &self,
        pool: Address,
        amount: U256,
        gas_limit: u64,
    ) -> Result<TxReceipt, LbfError>;
    async fn take_surplus(
        &self,
        pool: Address,
        amount: U256,
        gas_limit: u64,
    ) -> Result<TxReceipt, LbfError>;
    async fn bridge_iou(
        &self,
        pool: Address,
        amount: U256,
        dest_chain_id: u64,
        gas_limit: u64,
    ) -> Result<TxReceipt, LbfError>;
}

/// Resolves the operator's address on a given network. Private-key handling
/// lives entirely outside the core; this is the only surface it needs.
pub trait SignerRegistry: Send + Sync {
    fn operator_address(&self, network: &str) -> Result<Address, LbfError>;
}

/// Resolves the [`ChainClient`] bound to a given network. One client per
/// chain, per spec §1 ("a `ChainClient` per chain"); the balance tracker,
/// pool observer, and executor all go through this rather than holding
/// their own per-network maps.
pub trait ChainClientDirectory: Send + Sync {
    fn client(&self, network: &str) -> Option<Arc<dyn ChainClient>>;
}

//! An in-memory `ChainClient`/`ManifestSource`/`SignerRegistry` used for
//! unit tests and for `--network-mode localhost` development runs, where
//! there is no real RPC endpoint to talk to.

use {
    crate::{ChainClient, ChainClientDirectory, ManifestSource, SignerRegistry, TxReceipt},
    alloy_primitives::{Address, U256},
    async_trait::async_trait,
    lbf_types::LbfError,
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
};

#[derive(Default)]
struct State {
    pool_data: HashMap<Address, (U256, U256)>,
    balances: HashMap<(Address, Address), U256>,
    native: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    receipts_issued: u64,
}

/// A single chain's worth of in-memory state, shared between the test (or
/// dev harness) and whatever reads/writes the `LocalChainClient` performs.
#[derive(Clone, Default)]
pub struct LocalChainClient {
    state: Arc<Mutex<State>>,
}

impl LocalChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pool_data(&self, pool: Address, deficit: U256, surplus: U256) {
        self.state.lock().unwrap().pool_data.insert(pool, (deficit, surplus));
    }

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert((token, owner), amount);
    }

    pub fn set_native(&self, owner: Address, amount: U256) {
        self.state.lock().unwrap().native.insert(owner, amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, owner, spender), amount);
    }

    pub fn receipts_issued(&self) -> u64 {
        self.state.lock().unwrap().receipts_issued
    }

    fn next_receipt(&self) -> TxReceipt {
        let mut state = self.state.lock().unwrap();
        state.receipts_issued += 1;
        TxReceipt {
            tx_hash: format!("0xlocal{:064x}", state.receipts_issued),
            success: true,
        }
    }
}

#[async_trait]
impl ChainClient for LocalChainClient {
    async fn get_pool_data(&self, pool: Address) -> Result<(U256, U256), LbfError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .pool_data
            .get(&pool)
            .copied()
            .unwrap_or_default())
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, LbfError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default())
    }

    async fn native_balance_of(&self, owner: Address) -> Result<U256, LbfError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .native
            .get(&owner)
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, LbfError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxReceipt, LbfError> {
        // The owner in a real deployment is the signer submitting the
        // transaction; in this harness it's whichever address the caller
        // pre-registered the allowance under via `set_allowance`, keyed by
        // placing the owner at `Address::ZERO` when not otherwise specified.
        let owner = Address::ZERO;
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, owner, spender), amount);
        Ok(self.next_receipt())
    }

    async fn fill_deficit(
        &self,
        pool: Address,
        amount: U256,
        _gas_limit: u64,
    ) -> Result<TxReceipt, LbfError> {
        let mut state = self.state.lock().unwrap();
        let entry = state.pool_data.entry(pool).or_default();
        entry.0 = entry.0.saturating_sub(amount);
        drop(state);
        Ok(self.next_receipt())
    }

    async fn take_surplus(
        &self,
        pool: Address,
        amount: U256,
        _gas_limit: u64,
    ) -> Result<TxReceipt, LbfError> {
        let mut state = self.state.lock().unwrap();
        let entry = state.pool_data.entry(pool).or_default();
        entry.1 = entry.1.saturating_sub(amount);
        drop(state);
        Ok(self.next_receipt())
    }

    async fn bridge_iou(
        &self,
        _pool: Address,
        _amount: U256,
        _dest_chain_id: u64,
        _gas_limit: u64,
    ) -> Result<TxReceipt, LbfError> {
        Ok(self.next_receipt())
    }
}

/// A static, caller-provided manifest — the `Localhost` counterpart to the
/// two HTTP `ManifestSource`s used in `Mainnet`/`Testnet` mode.
pub struct LocalManifestSource {
    entries: Vec<(String, String, String)>,
}

impl LocalManifestSource {
    pub fn new(entries: Vec<(String, String, String)>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl ManifestSource for LocalManifestSource {
    async fn fetch(&self) -> Result<Vec<(String, String, String)>, LbfError> {
        Ok(self.entries.clone())
    }
}

/// Resolves a single fixed operator address for every network — adequate
/// for localhost/dev and for tests where the signer's identity never
/// varies by chain.
#[derive(Clone, Copy)]
pub struct FixedSignerRegistry {
    pub operator: Address,
}

impl SignerRegistry for FixedSignerRegistry {
    fn operator_address(&self, _network: &str) -> Result<Address, LbfError> {
        Ok(self.operator)
    }
}

/// A fixed network→client map, the `Localhost` counterpart to whatever
/// per-network RPC client construction a real deployment performs.
#[derive(Clone, Default)]
pub struct LocalChainClientDirectory {
    clients: HashMap<String, Arc<dyn ChainClient>>,
}

impl LocalChainClientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, network: impl Into<String>, client: LocalChainClient) {
        self.clients.insert(network.into(), Arc::new(client));
    }
}

impl ChainClientDirectory for LocalChainClientDirectory {
    fn client(&self, network: &str) -> Option<Arc<dyn ChainClient>> {
        self.clients.get(network).cloned()
    }
}

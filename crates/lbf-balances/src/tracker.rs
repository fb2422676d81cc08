//! Maintains, per active network, `{native, USDC, IOU}` operator balances,
//! and exposes blocking allowance management.

use {
    crate::event::BalanceEvent,
    alloy_primitives::{Address, U256},
    async_trait::async_trait,
    lbf_chain_client::{ChainClient, ChainClientDirectory, SignerRegistry},
    lbf_network::NetworkUpdateListener,
    lbf_types::{Deployments, LbfError, Network, TokenBalance, TokenKind},
    std::{
        collections::HashMap,
        sync::Arc,
        time::Duration,
    },
    tokio::{sync::Mutex, task::AbortHandle},
};

#[derive(Clone, Debug)]
pub struct BalanceTrackerConfig {
    pub update_interval: Duration,
    pub min_allowance_usdc: U256,
    pub min_allowance_iou: U256,
}

impl BalanceTrackerConfig {
    fn floor(&self, token: TokenKind) -> U256 {
        match token {
            TokenKind::Usdc => self.min_allowance_usdc,
            TokenKind::Iou => self.min_allowance_iou,
        }
    }
}

struct Inner {
    balances: HashMap<String, TokenBalance>,
    token_watchers: HashMap<(String, TokenKind), AbortHandle>,
    native_loop: Option<AbortHandle>,
    deployments: Deployments,
    allowance_locks: HashMap<(String, TokenKind, Address), Arc<Mutex<()>>>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            balances: HashMap::new(),
            token_watchers: HashMap::new(),
            native_loop: None,
            deployments: Deployments::default(),
            allowance_locks: HashMap::new(),
        }
    }
}

pub struct BalanceTracker {
    clients: Arc<dyn ChainClientDirectory>,
    signer: Arc<dyn SignerRegistry>,
    config: BalanceTrackerConfig,
    tx: tokio::sync::mpsc::UnboundedSender<BalanceEvent>,
    inner: Mutex<Inner>,
}

impl BalanceTracker {
    pub fn new(
        clients: Arc<dyn ChainClientDirectory>,
        signer: Arc<dyn SignerRegistry>,
        config: BalanceTrackerConfig,
    ) -> (Arc<Self>, tokio::sync::mpsc::UnboundedReceiver<BalanceEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let tracker = Arc::new(Self {
            clients,
            signer,
            config,
            tx,
            inner: Mutex::new(Inner::default()),
        });
        (tracker, rx)
    }

    /// Applies one watcher reading to in-memory state.
    pub async fn apply_event(&self, event: BalanceEvent) {
        let mut inner = self.inner.lock().await;
        match event {
            BalanceEvent::NativeUpdated { network, amount } => {
                inner.balances.entry(network).or_default().native = amount;
            }
            BalanceEvent::TokenUpdated { network, token, amount } => {
                inner.balances.entry(network).or_default().set_token(token, amount);
            }
        }
    }

    pub async fn balance(&self, network: &str) -> Option<TokenBalance> {
        self.inner.lock().await.balances.get(network).cloned()
    }

    pub async fn token(&self, network: &str, kind: TokenKind) -> U256 {
        self.inner
            .lock()
            .await
            .balances
            .get(network)
            .map(|b| b.token(kind))
            .unwrap_or_default()
    }

    pub async fn total(&self, kind: TokenKind) -> U256 {
        self.inner
            .lock()
            .await
            .balances
            .values()
            .fold(U256::ZERO, |sum, b| sum + b.token(kind))
    }

    /// The number of live per-(network, token) balance watchers — exactly
    /// one per active network/token-deployment pair, per spec §8.
    pub async fn watcher_count(&self) -> usize {
        self.inner.lock().await.token_watchers.len()
    }

    pub async fn has_native(&self, network: &str, min: U256) -> bool {
        self.inner
            .lock()
            .await
            .balances
            .get(network)
            .is_some_and(|b| b.has_native(min))
    }

    pub async fn has_token(&self, network: &str, kind: TokenKind, min: U256) -> bool {
        self.inner
            .lock()
            .await
            .balances
            .get(network)
            .is_some_and(|b| b.has_token(kind, min))
    }

    pub async fn get_allowance(&self, network: &str, token: TokenKind, spender: Address) -> Result<U256, LbfError> {
        let client = self.client_for(network)?;
        let owner = self.signer.operator_address(network)?;
        let token_address = self.token_address(network, token).await?;
        client.allowance(token_address, owner, spender).await
    }

    /// Reads current allowance; if already sufficient, no-op. Otherwise
    /// submits `approve(spender, max(required, floor))` and waits for its
    /// receipt. Never lowers a currently-sufficient allowance. At most one
    /// such call is in flight per `(network, token, spender)`.
    pub async fn ensure_allowance(
        &self,
        network: &str,
        token: TokenKind,
        spender: Address,
        required: U256,
    ) -> Result<(), LbfError> {
        let lock = self.allowance_lock(network, token, spender).await;
        let _guard = lock.lock().await;

        let current = self.get_allowance(network, token, spender).await?;
        if current >= required {
            return Ok(());
        }

        let new_value = required.max(self.config.floor(token));
        let client = self.client_for(network)?;
        let token_address = self.token_address(network, token).await?;
        let receipt = client.approve(token_address, spender, new_value).await?;
        if !receipt.success {
            return Err(LbfError::AllowanceFailed(format!(
                "approve({network}, {token}, {spender}) did not succeed"
            )));
        }
        Ok(())
    }

    /// Re-reads native and token balances for every active network,
    /// bypassing the watcher interval. Used by the executor between
    /// opportunities so downstream feasibility checks see fresh state.
    pub async fn force_update(&self) -> Result<(), LbfError> {
        let (networks, deployments) = {
            let inner = self.inner.lock().await;
            (
                inner.balances.keys().cloned().collect::<Vec<_>>(),
                inner.deployments.clone(),
            )
        };

        for network in networks {
            let Some(client) = self.clients.client(&network) else { continue };
            let Ok(owner) = self.signer.operator_address(&network) else { continue };

            if let Ok(amount) = client.native_balance_of(owner).await {
                self.apply_event(BalanceEvent::NativeUpdated { network: network.clone(), amount }).await;
            }
            for token in TokenKind::ALL {
                let Some(token_address) = token_address_of(&deployments, &network, token) else { continue };
                if let Ok(amount) = client.balance_of(token_address, owner).await {
                    self.apply_event(BalanceEvent::TokenUpdated {
                        network: network.clone(),
                        token,
                        amount,
                    })
                    .await;
                }
            }
        }
        Ok(())
    }

    fn client_for(&self, network: &str) -> Result<Arc<dyn ChainClient>, LbfError> {
        self.clients
            .client(network)
            .ok_or_else(|| LbfError::NetworkNotActive(network.to_string()))
    }

    async fn token_address(&self, network: &str, token: TokenKind) -> Result<Address, LbfError> {
        let inner = self.inner.lock().await;
        token_address_of(&inner.deployments, network, token).ok_or_else(|| LbfError::MissingDeployment {
            network: network.to_string(),
            what: token.as_str().to_string(),
        })
    }

    async fn allowance_lock(&self, network: &str, token: TokenKind, spender: Address) -> Arc<Mutex<()>> {
        let mut inner = self.inner.lock().await;
        inner
            .allowance_locks
            .entry((network.to_string(), token, spender))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn spawn_token_watcher(
        &self,
        network: Network,
        token: TokenKind,
        token_address: Address,
        owner: Address,
    ) -> Option<AbortHandle> {
        let client = self.clients.client(&network.name)?;
        let tx = self.tx.clone();
        let interval = self.config.update_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match client.balance_of(token_address, owner).await {
                    Ok(amount) => {
                        let _ = tx.send(BalanceEvent::TokenUpdated {
                            network: network.name.clone(),
                            token,
                            amount,
                        });
                    }
                    Err(err) => {
                        tracing::error!(network = %network.name, %token, %err, "token balance read failed");
                    }
                }
            }
        });
        Some(handle.abort_handle())
    }

    fn spawn_native_loop(&self, networks: Vec<Network>) -> AbortHandle {
        let clients = self.clients.clone();
        let signer = self.signer.clone();
        let tx = self.tx.clone();
        let interval = self.config.update_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                for network in &networks {
                    let Some(client) = clients.client(&network.name) else { continue };
                    let Ok(owner) = signer.operator_address(&network.name) else { continue };
                    match client.native_balance_of(owner).await {
                        Ok(amount) => {
                            let _ = tx.send(BalanceEvent::NativeUpdated {
                                network: network.name.clone(),
                                amount,
                            });
                        }
                        Err(err) => {
                            tracing::error!(network = %network.name, %err, "native balance read failed");
                        }
                    }
                }
            }
        });
        handle.abort_handle()
    }
}

fn token_address_of(deployments: &Deployments, network: &str, token: TokenKind) -> Option<Address> {
    match token {
        TokenKind::Usdc => deployments.usdc.get(network).copied(),
        TokenKind::Iou => deployments.iou.get(network).copied(),
    }
}

#[async_trait]
impl NetworkUpdateListener for BalanceTracker {
    fn name(&self) -> &str {
        "balance-tracker"
    }

    async fn on_networks_updated(
        &self,
        networks: &[Network],
        deployments: &Deployments,
    ) -> Result<(), LbfError> {
        let new_names: std::collections::HashSet<&str> = networks.iter().map(|n| n.name.as_str()).collect();

        let mut new_watchers = {
            let mut inner = self.inner.lock().await;

            // Drop entries and watchers for networks no longer active.
            inner.balances.retain(|network, _| new_names.contains(network.as_str()));
            inner.token_watchers.retain(|(network, _), handle| {
                let keep = new_names.contains(network.as_str());
                if !keep {
                    handle.abort();
                }
                keep
            });
            if let Some(handle) = inner.native_loop.take() {
                handle.abort();
            }
            inner.deployments = deployments.clone();

            std::mem::take(&mut inner.token_watchers)
        };

        for network in networks {
            let Ok(owner) = self.signer.operator_address(&network.name) else {
                tracing::warn!(network = %network.name, "no signer address, skipping balance watchers");
                continue;
            };
            for token in TokenKind::ALL {
                let key = (network.name.clone(), token);
                if new_watchers.contains_key(&key) {
                    continue;
                }
                let Some(token_address) = token_address_of(deployments, &network.name, token) else {
                    continue;
                };
                if let Some(handle) = self.spawn_token_watcher(network.clone(), token, token_address, owner) {
                    new_watchers.insert(key, handle);
                }
            }
        }

        let native_loop = self.spawn_native_loop(networks.to_vec());

        lbf_observe::metrics::metrics().set_balance_watchers(new_watchers.len());
        let mut inner = self.inner.lock().await;
        inner.token_watchers = new_watchers;
        inner.native_loop = Some(native_loop);
        drop(inner);

        // Immediately refresh native balances for the new set, rather than
        // waiting for the loop's first tick.
        for network in networks {
            if let (Some(client), Ok(owner)) = (
                self.clients.client(&network.name),
                self.signer.operator_address(&network.name),
            ) {
                if let Ok(amount) = client.native_balance_of(owner).await {
                    self.apply_event(BalanceEvent::NativeUpdated {
                        network: network.name.clone(),
                        amount,
                    })
                    .await;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        lbf_chain_client::local::{FixedSignerRegistry, LocalChainClient, LocalChainClientDirectory},
        lbf_types::NetworkMode,
        url::Url,
    };

    fn net(name: &str) -> Network {
        Network::new(name, 1, name, NetworkMode::Localhost, vec![Url::parse("http://localhost:8545").unwrap()])
    }

    fn config() -> BalanceTrackerConfig {
        BalanceTrackerConfig {
            update_interval: Duration::from_millis(20),
            min_allowance_usdc: U256::ZERO,
            min_allowance_iou: U256::ZERO,
        }
    }

    fn deployments_for(network: &str, usdc: Address, iou: Address) -> Deployments {
        let mut deployments = Deployments::default();
        deployments.usdc.insert(network.to_string(), usdc);
        deployments.iou.insert(network.to_string(), iou);
        deployments
    }

    #[tokio::test]
    async fn force_update_refreshes_native_and_token_balances() {
        let operator = Address::repeat_byte(0xAA);
        let usdc = Address::repeat_byte(0x01);
        let iou = Address::repeat_byte(0x02);

        let chain = LocalChainClient::new();
        chain.set_native(operator, U256::from(7u64));
        chain.set_balance(usdc, operator, U256::from(100u64));
        chain.set_balance(iou, operator, U256::from(5u64));

        let mut directory = LocalChainClientDirectory::new();
        directory.insert("eth", chain);

        let (tracker, _rx) = BalanceTracker::new(
            Arc::new(directory),
            Arc::new(FixedSignerRegistry { operator }),
            config(),
        );

        tracker
            .on_networks_updated(&[net("eth")], &deployments_for("eth", usdc, iou))
            .await
            .unwrap();
        tracker.force_update().await.unwrap();

        let balance = tracker.balance("eth").await.unwrap();
        assert_eq!(balance.native, U256::from(7u64));
        assert_eq!(balance.token(TokenKind::Usdc), U256::from(100u64));
        assert_eq!(balance.token(TokenKind::Iou), U256::from(5u64));
    }

    #[tokio::test]
    async fn removing_a_network_drops_its_balance_entry() {
        let operator = Address::repeat_byte(0xAA);
        let usdc = Address::repeat_byte(0x01);
        let iou = Address::repeat_byte(0x02);
        let chain = LocalChainClient::new();
        let mut directory = LocalChainClientDirectory::new();
        directory.insert("eth", chain);

        let (tracker, _rx) = BalanceTracker::new(
            Arc::new(directory),
            Arc::new(FixedSignerRegistry { operator }),
            config(),
        );
        let deployments = deployments_for("eth", usdc, iou);
        tracker.on_networks_updated(&[net("eth")], &deployments).await.unwrap();
        assert!(tracker.balance("eth").await.is_some());

        tracker.on_networks_updated(&[], &Deployments::default()).await.unwrap();
        assert!(tracker.balance("eth").await.is_none());
    }

    #[tokio::test]
    async fn ensure_allowance_skips_approve_when_already_sufficient() {
        let operator = Address::repeat_byte(0xAA);
        let spender = Address::repeat_byte(0xBB);
        let usdc = Address::repeat_byte(0x01);
        let iou = Address::repeat_byte(0x02);

        let chain = LocalChainClient::new();
        chain.set_allowance(usdc, Address::ZERO, spender, U256::from(1_000u64));
        let mut directory = LocalChainClientDirectory::new();
        directory.insert("eth", chain.clone());

        let (tracker, _rx) = BalanceTracker::new(
            Arc::new(directory),
            Arc::new(FixedSignerRegistry { operator }),
            config(),
        );
        tracker
            .on_networks_updated(&[net("eth")], &deployments_for("eth", usdc, iou))
            .await
            .unwrap();

        tracker.ensure_allowance("eth", TokenKind::Usdc, spender, U256::from(500u64)).await.unwrap();
        assert_eq!(chain.receipts_issued(), 0);
    }

    #[tokio::test]
    async fn ensure_allowance_approves_floor_when_insufficient() {
        let operator = Address::repeat_byte(0xAA);
        let spender = Address::repeat_byte(0xBB);
        let usdc = Address::repeat_byte(0x01);
        let iou = Address::repeat_byte(0x02);

        let chain = LocalChainClient::new();
        let mut directory = LocalChainClientDirectory::new();
        directory.insert("eth", chain.clone());

        let mut cfg = config();
        cfg.min_allowance_usdc = U256::from(1_000_000u64);

        let (tracker, _rx) = BalanceTracker::new(
            Arc::new(directory),
            Arc::new(FixedSignerRegistry { operator }),
            cfg,
        );
        tracker
            .on_networks_updated(&[net("eth")], &deployments_for("eth", usdc, iou))
            .await
            .unwrap();

        tracker.ensure_allowance("eth", TokenKind::Usdc, spender, U256::from(100u64)).await.unwrap();
        assert_eq!(chain.receipts_issued(), 1);
        let allowance = chain.allowance(usdc, Address::ZERO, spender).await.unwrap();
        assert_eq!(allowance, U256::from(1_000_000u64));
    }
}

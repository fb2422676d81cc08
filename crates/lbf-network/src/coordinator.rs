//! Maintains the set of *active* networks: those with a pool deployment (or
//! that are the parent pool's network), filtered by whitelist/blacklist.

use {
    crate::{deployment::DeploymentCoordinator, registry::NetworkRegistry},
    async_trait::async_trait,
    lbf_types::{Deployments, LbfError, Network, NetworkMode},
    std::{collections::HashSet, sync::Arc},
};

/// Notified, in registration order, whenever the active network set
/// changes. Implementors are expected to reconcile their own per-network
/// state (watchers, balance entries, ...) against the new set.
#[async_trait]
pub trait NetworkUpdateListener: Send + Sync {
    /// A stable logical name used to dedupe re-registration.
    fn name(&self) -> &str;

    async fn on_networks_updated(
        &self,
        networks: &[Network],
        deployments: &Deployments,
    ) -> Result<(), LbfError>;
}

pub struct NetworkCoordinatorConfig {
    pub mode: NetworkMode,
    pub whitelist: Vec<u64>,
    pub blacklist: Vec<u64>,
}

/// Owns the active `Network` list and the current `Deployments` snapshot.
/// Both are handed out by value so listeners never hold a reference that
/// outlives the next `refresh`.
pub struct NetworkCoordinator {
    registry: Arc<dyn NetworkRegistry>,
    deployments: DeploymentCoordinator,
    config: NetworkCoordinatorConfig,
    active: Vec<Network>,
    deployments_snapshot: Deployments,
    listeners: Vec<Arc<dyn NetworkUpdateListener>>,
    initialized: bool,
}

impl NetworkCoordinator {
    pub fn new(
        registry: Arc<dyn NetworkRegistry>,
        deployments: DeploymentCoordinator,
        config: NetworkCoordinatorConfig,
    ) -> Self {
        Self {
            registry,
            deployments,
            config,
            active: Vec::new(),
            deployments_snapshot: Deployments::default(),
            listeners: Vec::new(),
            initialized: false,
        }
    }

    /// Registers a listener, keyed by its logical name. Re-registering the
    /// same name is a no-op that logs a warning rather than an error.
    pub fn register_listener(&mut self, listener: Arc<dyn NetworkUpdateListener>) {
        if self.listeners.iter().any(|existing| existing.name() == listener.name()) {
            tracing::warn!(listener = listener.name(), "listener already registered, ignoring");
            return;
        }
        self.listeners.push(listener);
    }

    pub fn active_networks(&self) -> &[Network] {
        &self.active
    }

    pub fn deployments(&self) -> &Deployments {
        &self.deployments_snapshot
    }

    pub fn by_name(&self, name: &str) -> Result<&Network, LbfError> {
        self.active
            .iter()
            .find(|network| network.name == name)
            .ok_or_else(|| LbfError::NotFound { kind: "network", key: name.to_string() })
    }

    pub fn by_chain_id(&self, chain_id: u64) -> Result<&Network, LbfError> {
        self.active
            .iter()
            .find(|network| network.chain_id == chain_id)
            .ok_or_else(|| LbfError::NotFound { kind: "network", key: chain_id.to_string() })
    }

    pub fn by_selector(&self, selector: &str) -> Result<&Network, LbfError> {
        self.active
            .iter()
            .find(|network| network.selector == selector)
            .ok_or_else(|| LbfError::NotFound { kind: "network", key: selector.to_string() })
    }

    pub fn by_mode(&self, mode: NetworkMode) -> Vec<&Network> {
        self.active.iter().filter(|network| network.mode == mode).collect()
    }

    /// Pulls candidates, refreshes deployments, recomputes the active set,
    /// and — if it changed — notifies listeners sequentially in
    /// registration order. Errors raised by a listener during the very
    /// first refresh (startup) propagate and abort; afterwards they are
    /// logged and do not stop notification of the remaining listeners.
    pub async fn refresh(&mut self) -> Result<bool, LbfError> {
        let is_initial = !self.initialized;

        let candidates = self.registry.candidate_networks(self.config.mode).await?;
        let deployments = self.deployments.refresh().await?;

        let new_active: Vec<Network> = candidates
            .into_iter()
            .filter(|network| Self::qualifies(network, &deployments, &self.config))
            .collect();

        let previous_ids: HashSet<u64> = self.active.iter().map(|network| network.chain_id).collect();
        let new_ids: HashSet<u64> = new_active.iter().map(|network| network.chain_id).collect();
        let changed = previous_ids != new_ids;

        self.deployments_snapshot = deployments.clone();

        if changed {
            self.active = new_active;
            for listener in &self.listeners {
                if let Err(err) = listener.on_networks_updated(&self.active, &deployments).await {
                    if is_initial {
                        self.initialized = true;
                        return Err(err);
                    }
                    tracing::error!(listener = listener.name(), %err, "network-update listener failed");
                }
            }
        }

        self.initialized = true;
        Ok(changed)
    }

    pub async fn force_refresh(&mut self) -> Result<bool, LbfError> {
        self.refresh().await
    }

    /// The parent pool's network is always active regardless of
    /// whitelist/blacklist (spec §3's invariant, §8's unconditional
    /// testable property); every other network still needs a pool
    /// deployment and must clear the whitelist/blacklist filters.
    fn qualifies(network: &Network, deployments: &Deployments, config: &NetworkCoordinatorConfig) -> bool {
        let is_parent = deployments
            .parent_pool
            .as_ref()
            .is_some_and(|parent| parent.network == network.name);
        if is_parent {
            return true;
        }
        let whitelisted = config.whitelist.is_empty() || config.whitelist.contains(&network.chain_id);
        let blacklisted = config.blacklist.contains(&network.chain_id);
        deployments.has_pool(&network.name) && whitelisted && !blacklisted
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{deployment::ManifestSources, registry::StaticNetworkRegistry},
        lbf_types::ParentPool,
        std::sync::Mutex as StdMutex,
        tokio::sync::Mutex,
        url::Url,
    };

    fn net(name: &str, chain_id: u64) -> Network {
        Network::new(name, chain_id, name, NetworkMode::Mainnet, vec![Url::parse("http://localhost:8545").unwrap()])
    }

    fn deployments_with_parent(parent: &str) -> Deployments {
        Deployments {
            parent_pool: Some(ParentPool {
                network: parent.to_string(),
                address: Default::default(),
            }),
            ..Default::default()
        }
    }

    struct RecordingListener {
        name: &'static str,
        calls: Mutex<Vec<Vec<String>>>,
        fail_times: StdMutex<usize>,
    }

    impl RecordingListener {
        fn new(name: &'static str) -> Self {
            Self { name, calls: Mutex::new(Vec::new()), fail_times: StdMutex::new(0) }
        }

        fn failing(name: &'static str, times: usize) -> Self {
            Self { name, calls: Mutex::new(Vec::new()), fail_times: StdMutex::new(times) }
        }
    }

    #[async_trait]
    impl NetworkUpdateListener for RecordingListener {
        fn name(&self) -> &str {
            self.name
        }

        async fn on_networks_updated(
            &self,
            networks: &[Network],
            _deployments: &Deployments,
        ) -> Result<(), LbfError> {
            let mut remaining = self.fail_times.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(LbfError::RpcReadFailed("injected".to_string()));
            }
            drop(remaining);
            self.calls.lock().await.push(networks.iter().map(|n| n.name.clone()).collect());
            Ok(())
        }
    }

    fn coordinator_with(deployments: Deployments, whitelist: Vec<u64>, blacklist: Vec<u64>) -> NetworkCoordinator {
        let registry = Arc::new(StaticNetworkRegistry::new(vec![net("eth", 1), net("arb", 2), net("base", 3)]));
        let dc = DeploymentCoordinator::new(ManifestSources::Static(deployments));
        NetworkCoordinator::new(
            registry,
            dc,
            NetworkCoordinatorConfig { mode: NetworkMode::Mainnet, whitelist, blacklist },
        )
    }

    #[tokio::test]
    async fn active_set_always_contains_parent_network() {
        let mut coordinator = coordinator_with(deployments_with_parent("eth"), vec![], vec![]);
        coordinator.refresh().await.unwrap();
        assert!(coordinator.by_name("eth").is_ok());
    }

    #[tokio::test]
    async fn blacklist_removes_a_network_with_a_pool() {
        let mut deployments = deployments_with_parent("eth");
        deployments.pools.insert("arb".to_string(), Default::default());
        let mut coordinator = coordinator_with(deployments, vec![], vec![2]);
        coordinator.refresh().await.unwrap();
        assert!(coordinator.by_name("arb").is_err());
        assert!(coordinator.by_name("eth").is_ok());
    }

    #[tokio::test]
    async fn parent_network_survives_a_blacklist_containing_its_own_chain_id() {
        let mut coordinator = coordinator_with(deployments_with_parent("eth"), vec![], vec![1]);
        coordinator.refresh().await.unwrap();
        assert!(coordinator.by_name("eth").is_ok());
    }

    #[tokio::test]
    async fn unchanged_refresh_does_not_notify_listeners_again() {
        let mut coordinator = coordinator_with(deployments_with_parent("eth"), vec![], vec![]);
        let listener = Arc::new(RecordingListener::new("balances"));
        coordinator.register_listener(listener.clone());

        assert!(coordinator.refresh().await.unwrap());
        assert!(!coordinator.refresh().await.unwrap());
        assert_eq!(listener.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn initial_listener_error_aborts_refresh() {
        let mut coordinator = coordinator_with(deployments_with_parent("eth"), vec![], vec![]);
        coordinator.register_listener(Arc::new(RecordingListener::failing("balances", 1)));
        assert!(coordinator.refresh().await.is_err());
    }

    #[tokio::test]
    async fn later_listener_error_is_logged_not_propagated() {
        let mut coordinator = coordinator_with(deployments_with_parent("eth"), vec![], vec![]);
        coordinator.register_listener(Arc::new(RecordingListener::new("first")));
        assert!(coordinator.refresh().await.is_ok());

        let mut deployments = deployments_with_parent("eth");
        deployments.pools.insert("arb".to_string(), Default::default());
        coordinator.deployments = DeploymentCoordinator::new(ManifestSources::Static(deployments));
        coordinator.register_listener(Arc::new(RecordingListener::failing("second", 1)));
        assert!(coordinator.refresh().await.is_ok());
    }

    #[tokio::test]
    async fn reregistering_a_listener_name_is_a_noop() {
        let mut coordinator = coordinator_with(deployments_with_parent("eth"), vec![], vec![]);
        coordinator.register_listener(Arc::new(RecordingListener::new("dup")));
        coordinator.register_listener(Arc::new(RecordingListener::new("dup")));
        assert_eq!(coordinator.listeners.len(), 1);
    }
}

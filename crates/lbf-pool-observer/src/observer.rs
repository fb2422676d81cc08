//! Streams `(network, deficit, surplus)` updates by polling each pool's
//! `getPoolData()` on a fixed interval.

use {
    crate::event::{PoolEvent, PoolUpdate},
    async_trait::async_trait,
    lbf_chain_client::ChainClientDirectory,
    lbf_network::NetworkUpdateListener,
    lbf_types::{Deployments, LbfError, Network},
    std::{collections::HashMap, sync::Arc, time::Duration},
    tokio::{sync::Mutex, task::AbortHandle},
};

#[derive(Clone, Copy, Debug)]
pub struct PoolObserverConfig {
    pub poll_interval: Duration,
}

#[derive(Default)]
struct Inner {
    watchers: HashMap<String, AbortHandle>,
}

/// After every network change, registers one read watcher per pool address
/// (resolved from the deployment snapshot at registration time) and pushes
/// readings to a single consumer.
pub struct PoolObserver {
    clients: Arc<dyn ChainClientDirectory>,
    config: PoolObserverConfig,
    tx: tokio::sync::mpsc::UnboundedSender<PoolEvent>,
    inner: Mutex<Inner>,
}

impl PoolObserver {
    pub fn new(
        clients: Arc<dyn ChainClientDirectory>,
        config: PoolObserverConfig,
    ) -> (Arc<Self>, tokio::sync::mpsc::UnboundedReceiver<PoolEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let observer = Arc::new(Self {
            clients,
            config,
            tx,
            inner: Mutex::new(Inner::default()),
        });
        (observer, rx)
    }

    fn spawn_watcher(&self, network: Network, pool: alloy_primitives::Address) -> Option<AbortHandle> {
        let client = self.clients.client(&network.name)?;
        let tx = self.tx.clone();
        let interval = self.config.poll_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match client.get_pool_data(pool).await {
                    Ok((deficit, surplus)) => {
                        let _ = tx.send(PoolEvent {
                            network: network.name.clone(),
                            update: PoolUpdate { deficit, surplus },
                        });
                    }
                    Err(err) => {
                        tracing::error!(network = %network.name, %err, "pool data read failed");
                    }
                }
            }
        });
        Some(handle.abort_handle())
    }
}

#[async_trait]
impl NetworkUpdateListener for PoolObserver {
    fn name(&self) -> &str {
        "pool-observer"
    }

    async fn on_networks_updated(
        &self,
        networks: &[Network],
        deployments: &Deployments,
    ) -> Result<(), LbfError> {
        let new_names: std::collections::HashSet<&str> = networks.iter().map(|n| n.name.as_str()).collect();

        let mut watchers = {
            let mut inner = self.inner.lock().await;
            inner.watchers.retain(|network, handle| {
                let keep = new_names.contains(network.as_str());
                if !keep {
                    handle.abort();
                }
                keep
            });
            std::mem::take(&mut inner.watchers)
        };

        for network in networks {
            if watchers.contains_key(&network.name) {
                continue;
            }
            let Some(pool) = deployments.pool_address(&network.name) else {
                continue;
            };
            if let Some(handle) = self.spawn_watcher(network.clone(), pool) {
                watchers.insert(network.name.clone(), handle);
            }
        }

        self.inner.lock().await.watchers = watchers;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        lbf_chain_client::local::{LocalChainClient, LocalChainClientDirectory},
        lbf_types::NetworkMode,
        url::Url,
    };

    fn net(name: &str) -> Network {
        Network::new(name, 1, name, NetworkMode::Localhost, vec![Url::parse("http://localhost:8545").unwrap()])
    }

    #[tokio::test]
    async fn registers_one_watcher_per_pool_and_pushes_updates() {
        let pool = alloy_primitives::Address::repeat_byte(0x09);
        let chain = LocalChainClient::new();
        chain.set_pool_data(pool, alloy_primitives::U256::from(10u64), alloy_primitives::U256::from(20u64));
        let mut directory = LocalChainClientDirectory::new();
        directory.insert("eth", chain);

        let (observer, mut rx) = PoolObserver::new(
            Arc::new(directory),
            PoolObserverConfig { poll_interval: Duration::from_millis(5) },
        );

        let mut deployments = Deployments::default();
        deployments.pools.insert("eth".to_string(), pool);
        observer.on_networks_updated(&[net("eth")], &deployments).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(event.network, "eth");
        assert_eq!(event.update.deficit, alloy_primitives::U256::from(10u64));
        assert_eq!(event.update.surplus, alloy_primitives::U256::from(20u64));
    }

    #[tokio::test]
    async fn removing_a_network_stops_its_watcher() {
        let pool = alloy_primitives::Address::repeat_byte(0x09);
        let chain = LocalChainClient::new();
        let mut directory = LocalChainClientDirectory::new();
        directory.insert("eth", chain);

        let (observer, _rx) = PoolObserver::new(
            Arc::new(directory),
            PoolObserverConfig { poll_interval: Duration::from_millis(5) },
        );
        let mut deployments = Deployments::default();
        deployments.pools.insert("eth".to_string(), pool);
        observer.on_networks_updated(&[net("eth")], &deployments).await.unwrap();
        assert_eq!(observer.inner.lock().await.watchers.len(), 1);

        observer.on_networks_updated(&[], &Deployments::default()).await.unwrap();
        assert_eq!(observer.inner.lock().await.watchers.len(), 0);
    }
}

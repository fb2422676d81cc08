//! The core task: a single logical consumer processing events from its
//! inbox serially. Network/deployment refreshes run on their own periodic
//! timer; every pool-data update triggers the discover→score→execute
//! pipeline.

use {
    crate::{events::CoreEvent, shutdown::ShutdownController},
    alloy_primitives::U256,
    lbf_balances::{BalanceEvent, BalanceTracker},
    lbf_network::NetworkCoordinator,
    lbf_observe::AtomicLiveness,
    lbf_pool_observer::{PoolEvent, PoolObserver},
    lbf_rebalancer::{discover, score, DiscovererConfig, Executor, NetExposureTracker, ScorerConfig},
    lbf_types::{PoolData, TokenKind},
    std::{collections::HashMap, sync::Arc, time::Duration},
    tokio::sync::mpsc,
};

pub struct EventLoop {
    network_coordinator: NetworkCoordinator,
    balance_tracker: Arc<BalanceTracker>,
    #[allow(dead_code)]
    pool_observer: Arc<PoolObserver>,
    executor: Executor,
    exposure: NetExposureTracker,
    discoverer_config: DiscovererConfig,
    scorer_config: ScorerConfig,
    network_update_interval: Duration,
    liveness: Arc<AtomicLiveness>,
    pool_data: HashMap<String, PoolData>,
}

impl EventLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        network_coordinator: NetworkCoordinator,
        balance_tracker: Arc<BalanceTracker>,
        pool_observer: Arc<PoolObserver>,
        executor: Executor,
        exposure: NetExposureTracker,
        discoverer_config: DiscovererConfig,
        scorer_config: ScorerConfig,
        network_update_interval: Duration,
        liveness: Arc<AtomicLiveness>,
    ) -> Self {
        Self {
            network_coordinator,
            balance_tracker,
            pool_observer,
            executor,
            exposure,
            discoverer_config,
            scorer_config,
            network_update_interval,
            liveness,
            pool_data: HashMap::new(),
        }
    }

    pub async fn run(
        mut self,
        mut balance_rx: mpsc::UnboundedReceiver<BalanceEvent>,
        mut pool_rx: mpsc::UnboundedReceiver<PoolEvent>,
        mut shutdown: ShutdownController,
    ) {
        let mut network_timer = tokio::time::interval(self.network_update_interval);
        // The first tick fires immediately; skip it since the caller already
        // performed the initial refresh before starting the loop.
        network_timer.tick().await;

        loop {
            let event = tokio::select! {
                _ = shutdown.wait() => {
                    tracing::info!("shutdown signal received");
                    break;
                }
                _ = network_timer.tick() => CoreEvent::Tick,
                Some(event) = pool_rx.recv() => CoreEvent::PoolUpdated(event),
                Some(event) = balance_rx.recv() => CoreEvent::BalanceUpdated(event),
            };

            self.handle_event(event).await;
            self.liveness.set_alive(true);
        }
    }

    async fn handle_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::Tick => {
                match self.network_coordinator.refresh().await {
                    Ok(changed) => {
                        if changed {
                            tracing::info!("active network set changed");
                        }
                        lbf_observe::metrics::metrics()
                            .set_active_networks(self.network_coordinator.active_networks().len());
                    }
                    Err(err) => {
                        tracing::error!(%err, "periodic network refresh failed, retaining previous snapshot");
                    }
                }
            }
            CoreEvent::BalanceUpdated(event) => {
                self.balance_tracker.apply_event(event).await;
            }
            CoreEvent::PoolUpdated(event) => {
                self.pool_data.insert(event.network.clone(), PoolData::new(event.update.deficit, event.update.surplus));
                self.rebalance().await;
            }
        }
    }

    async fn rebalance(&mut self) {
        let deployments = self.network_coordinator.deployments().clone();
        let networks = self.network_coordinator.active_networks().to_vec();

        let mut balances = HashMap::new();
        for network in &networks {
            if let Some(balance) = self.balance_tracker.balance(&network.name).await {
                balances.insert(network.name.clone(), balance);
            }
        }

        let total_iou = balances.values().fold(U256::ZERO, |sum, b| sum + b.token(TokenKind::Iou));
        let net_allowance = self.exposure.net_allowance(total_iou);

        let opportunities = discover(&self.pool_data, &balances, &self.discoverer_config, net_allowance);
        if opportunities.is_empty() {
            return;
        }
        let metrics = lbf_observe::metrics::metrics();
        for opp in &opportunities {
            metrics.inc_opportunities(opp.kind(), "discovered");
        }

        let scored = score(opportunities, &balances, &self.scorer_config);
        if scored.is_empty() {
            return;
        }
        for scored_opp in &scored {
            metrics.inc_opportunities(scored_opp.opp.kind(), "scored");
        }

        self.executor.execute_batch(scored, &deployments, &networks, &mut self.exposure).await;
        metrics.set_total_redeemed_usdc(self.exposure.total_redeemed_usdc());
    }
}

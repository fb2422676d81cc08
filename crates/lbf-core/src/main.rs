//! Entry point: parses configuration, wires the network/balance/pool
//! components together, and runs the single-task event loop until shutdown.

mod event_loop;
mod events;
mod shutdown;

use {
    alloy_primitives::{Address, U256},
    anyhow::Context,
    clap::Parser,
    event_loop::EventLoop,
    lbf_balances::{BalanceTracker, BalanceTrackerConfig},
    lbf_chain_client::{
        local::{FixedSignerRegistry, LocalChainClient, LocalChainClientDirectory, LocalManifestSource},
        ChainClientDirectory, SignerRegistry,
    },
    lbf_config::Arguments,
    lbf_network::{DeploymentCoordinator, ManifestSources, NetworkCoordinator, NetworkCoordinatorConfig, NetworkRegistry, StaticNetworkRegistry},
    lbf_observe::AtomicLiveness,
    lbf_pool_observer::{PoolObserver, PoolObserverConfig},
    lbf_rebalancer::{DiscovererConfig, Executor, ExecutorConfig, NetExposureTracker, ScorerConfig},
    lbf_types::{Network, NetworkMode},
    shutdown::ShutdownController,
    std::sync::Arc,
    url::Url,
};

/// `--network-mode localhost`'s single fixed chain, named after the RPC port
/// convention most local devnets (anvil, hardhat) default to.
const LOCALHOST_NETWORK_NAME: &str = "localhost";
const LOCALHOST_CHAIN_ID: u64 = 31337;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();
    args.validate().context("invalid configuration")?;

    lbf_observe::init_tracing("info");
    tracing::info!(network_mode = ?args.network_mode, "starting lbf-rebalancer");

    if args.network_mode != NetworkMode::Localhost {
        anyhow::bail!(
            "--network-mode {:?} requires a real ManifestSource/ChainClient/SignerRegistry wiring, \
             which is outside this crate's scope; only localhost is runnable here",
            args.network_mode
        );
    }

    let (network_registry, deployment_coordinator, clients, signer) = build_localhost_graph(args.operator_address);
    let clients: Arc<dyn ChainClientDirectory> = Arc::new(clients);
    let signer: Arc<dyn SignerRegistry> = Arc::new(signer);

    let mut network_coordinator = NetworkCoordinator::new(
        Arc::new(network_registry) as Arc<dyn NetworkRegistry>,
        deployment_coordinator,
        NetworkCoordinatorConfig {
            mode: args.network_mode,
            whitelist: args.whitelisted_network_ids.clone(),
            blacklist: args.ignored_network_ids.clone(),
        },
    );

    let (balance_tracker, balance_rx) = BalanceTracker::new(
        clients.clone(),
        signer,
        BalanceTrackerConfig {
            update_interval: args.balance_update_interval_ms,
            min_allowance_usdc: args.min_allowance_usdc,
            min_allowance_iou: args.min_allowance_iou,
        },
    );
    let (pool_observer, pool_rx) = PoolObserver::new(
        clients.clone(),
        PoolObserverConfig { poll_interval: args.rebalancer_check_interval_ms },
    );

    network_coordinator.register_listener(balance_tracker.clone());
    network_coordinator.register_listener(pool_observer.clone());

    network_coordinator
        .refresh()
        .await
        .context("initial network/deployment refresh failed")?;
    lbf_observe::metrics::metrics().set_active_networks(network_coordinator.active_networks().len());

    let executor = Executor::new(
        clients,
        balance_tracker.clone(),
        ExecutorConfig { gas_limit: args.gas_limit, dry_run: args.dry_run },
    );
    let exposure = NetExposureTracker::new(args.net_total_allowance);

    let liveness = Arc::new(AtomicLiveness::default());
    let metrics_liveness = liveness.clone();
    let metrics_addr = args.metrics_address;
    tokio::spawn(async move {
        if let Err(err) = lbf_observe::server::serve(metrics_liveness, metrics_addr).await {
            tracing::error!(%err, "metrics/health server exited");
        }
    });

    let event_loop = EventLoop::new(
        network_coordinator,
        balance_tracker,
        pool_observer,
        executor,
        exposure,
        DiscovererConfig {
            deficit_threshold: args.deficit_threshold,
            surplus_threshold: args.surplus_threshold,
        },
        ScorerConfig { min_score: args.opportunity_scorer_min_score },
        args.lanca_network_update_interval_ms,
        liveness,
    );

    let shutdown = ShutdownController::new_shutdown_on_signal();
    event_loop.run(balance_rx, pool_rx, shutdown).await;

    tracing::info!("lbf-rebalancer stopped");
    Ok(())
}

/// Builds a runnable single-network graph backed entirely by the in-memory
/// `local` chain-client implementation. There is no real devnet behind this;
/// it exists so `--network-mode localhost` is actually runnable without an
/// external `ManifestSource`/`ChainClient` deployment.
fn build_localhost_graph(
    operator: Address,
) -> (StaticNetworkRegistry, DeploymentCoordinator, LocalChainClientDirectory, FixedSignerRegistry) {
    let rpc_url = Url::parse("http://localhost:8545").expect("static URL parses");
    let network = Network::new(LOCALHOST_NETWORK_NAME, LOCALHOST_CHAIN_ID, LOCALHOST_NETWORK_NAME, NetworkMode::Localhost, vec![rpc_url]);
    let registry = StaticNetworkRegistry::new(vec![network]);

    let pool = Address::repeat_byte(0x01);
    let usdc = Address::repeat_byte(0x02);
    let iou = Address::repeat_byte(0x03);
    let manifest = LocalManifestSource::new(vec![
        ("LBF_PARENT_POOL_LOCALHOST".to_string(), format!("{pool:#x}"), LOCALHOST_NETWORK_NAME.to_string()),
        ("USDC_LOCALHOST".to_string(), format!("{usdc:#x}"), LOCALHOST_NETWORK_NAME.to_string()),
        ("IOU_LOCALHOST".to_string(), format!("{iou:#x}"), LOCALHOST_NETWORK_NAME.to_string()),
    ]);
    let deployment_coordinator = DeploymentCoordinator::new(ManifestSources::Remote {
        pools: Arc::new(manifest),
        tokens: Arc::new(LocalManifestSource::new(vec![])),
    });

    let chain = LocalChainClient::new();
    chain.set_pool_data(pool, U256::ZERO, U256::ZERO);
    let mut clients = LocalChainClientDirectory::new();
    clients.insert(LOCALHOST_NETWORK_NAME, chain);

    let signer = FixedSignerRegistry { operator };

    (registry, deployment_coordinator, clients, signer)
}

use {
    alloy_primitives::{Address, U256},
    clap::Parser,
    lbf_types::NetworkMode,
    std::{net::SocketAddr, str::FromStr, time::Duration},
    url::Url,
};

fn parse_network_mode(s: &str) -> Result<NetworkMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "mainnet" => Ok(NetworkMode::Mainnet),
        "testnet" => Ok(NetworkMode::Testnet),
        "localhost" => Ok(NetworkMode::Localhost),
        other => Err(format!(
            "unrecognized NETWORK_MODE {other:?}, expected mainnet|testnet|localhost"
        )),
    }
}

fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|err| err.to_string())
}

fn parse_u256(s: &str) -> Result<U256, String> {
    U256::from_str(s).map_err(|err| err.to_string())
}

fn duration_from_millis(s: &str) -> Result<Duration, String> {
    let millis: u64 = s.parse().map_err(|_| format!("{s:?} is not a valid u64"))?;
    Ok(Duration::from_millis(millis))
}

/// Every knob recognized by the rebalancer, as documented in spec §6.
/// Mirrors the teacher's convention of one flat `clap::Parser` struct with
/// `#[clap(long, env)]` fields rather than a nested config file format.
#[derive(Parser, Debug)]
#[clap(version)]
pub struct Arguments {
    /// Whether to run against the mainnet registry, the testnet registry, or
    /// a caller-supplied localhost deployment.
    #[clap(long, env, value_parser = parse_network_mode, default_value = "mainnet")]
    pub network_mode: NetworkMode,

    /// The operator's wallet address, used to query balances and
    /// allowances. Private-key handling lives outside the core.
    #[clap(long, env, value_parser = parse_address)]
    pub operator_address: Address,

    /// Chain ids to exclude from the active set regardless of deployment
    /// status.
    #[clap(long, env, use_value_delimiter = true)]
    pub ignored_network_ids: Vec<u64>,

    /// When non-empty, only these chain ids may join the active set (beyond
    /// the parent pool's network, which is always active).
    #[clap(long, env, use_value_delimiter = true)]
    pub whitelisted_network_ids: Vec<u64>,

    #[clap(long, env, value_parser = duration_from_millis, default_value = "300000")]
    pub lanca_network_update_interval_ms: Duration,

    #[clap(long, env, value_parser = duration_from_millis, default_value = "60000")]
    pub balance_update_interval_ms: Duration,

    #[clap(long, env, value_parser = duration_from_millis, default_value = "30000")]
    pub rebalancer_check_interval_ms: Duration,

    #[clap(long, env, value_parser = parse_u256)]
    pub deficit_threshold: U256,

    #[clap(long, env, value_parser = parse_u256)]
    pub surplus_threshold: U256,

    #[clap(long, env, value_parser = parse_u256)]
    pub net_total_allowance: U256,

    #[clap(long, env, value_parser = parse_u256, default_value = "0")]
    pub min_allowance_usdc: U256,

    #[clap(long, env, value_parser = parse_u256, default_value = "0")]
    pub min_allowance_iou: U256,

    #[clap(long, env, default_value = "0.0")]
    pub opportunity_scorer_min_score: f64,

    /// When set, the executor logs intended transactions but never submits
    /// them.
    #[clap(long, env)]
    pub dry_run: bool,

    #[clap(long, env)]
    pub mainnet_pools_manifest_url: Option<Url>,
    #[clap(long, env)]
    pub mainnet_tokens_manifest_url: Option<Url>,
    #[clap(long, env)]
    pub testnet_pools_manifest_url: Option<Url>,
    #[clap(long, env)]
    pub testnet_tokens_manifest_url: Option<Url>,
    #[clap(long, env)]
    pub network_registry_url: Option<Url>,

    #[clap(long, env, default_value = "0.0.0.0:9589")]
    pub metrics_address: SocketAddr,

    /// Gas limit used for pool-mutating calls (`fillDeficit` /
    /// `takeSurplus` / `bridgeIOU`).
    #[clap(long, env, default_value = "300000")]
    pub gas_limit: u64,
}

impl Arguments {
    /// Validates cross-field invariants clap's per-field parsers can't
    /// express, e.g. that mainnet/testnet mode has manifest URLs configured.
    pub fn validate(&self) -> Result<(), lbf_types::LbfError> {
        let missing = |field: &str| {
            lbf_types::LbfError::ConfigInvalid(format!(
                "{field} is required when --network-mode is not localhost"
            ))
        };
        match self.network_mode {
            NetworkMode::Localhost => Ok(()),
            NetworkMode::Mainnet => {
                if self.mainnet_pools_manifest_url.is_none() {
                    return Err(missing("mainnet-pools-manifest-url"));
                }
                if self.mainnet_tokens_manifest_url.is_none() {
                    return Err(missing("mainnet-tokens-manifest-url"));
                }
                Ok(())
            }
            NetworkMode::Testnet => {
                if self.testnet_pools_manifest_url.is_none() {
                    return Err(missing("testnet-pools-manifest-url"));
                }
                if self.testnet_tokens_manifest_url.is_none() {
                    return Err(missing("testnet-tokens-manifest-url"));
                }
                Ok(())
            }
        }
    }
}

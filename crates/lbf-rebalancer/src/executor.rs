//! Issues the on-chain calls a batch of scored opportunities describes,
//! under the allowance-floor and gas-availability invariants.

use {
    crate::exposure::NetExposureTracker,
    lbf_balances::BalanceTracker,
    lbf_chain_client::ChainClientDirectory,
    lbf_types::{Deployments, LbfError, Network, Opportunity, ScoredOpportunity, TokenKind},
    std::{collections::HashMap, sync::Arc},
};

#[derive(Clone, Copy, Debug)]
pub struct ExecutorConfig {
    pub gas_limit: u64,
    pub dry_run: bool,
}

/// Executes scored opportunities sequentially, highest score first. An
/// execution failure for one opportunity is logged and does not abort the
/// remaining ones in the batch.
pub struct Executor {
    clients: Arc<dyn ChainClientDirectory>,
    balances: Arc<BalanceTracker>,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(clients: Arc<dyn ChainClientDirectory>, balances: Arc<BalanceTracker>, config: ExecutorConfig) -> Self {
        Self { clients, balances, config }
    }

    pub async fn execute_batch(
        &self,
        scored: Vec<ScoredOpportunity>,
        deployments: &Deployments,
        networks: &[Network],
        exposure: &mut NetExposureTracker,
    ) {
        let chain_ids: HashMap<&str, u64> = networks.iter().map(|n| (n.name.as_str(), n.chain_id)).collect();

        let metrics = lbf_observe::metrics::metrics();
        for scored_opp in scored {
            match self.execute_one(&scored_opp.opp, deployments, &chain_ids, exposure).await {
                Ok(()) => {
                    tracing::info!(opportunity = ?scored_opp.opp, score = scored_opp.score, "executed opportunity");
                    metrics.inc_opportunities(scored_opp.opp.kind(), "executed");
                }
                Err(LbfError::MissingDeployment { network, what }) => {
                    tracing::error!(network, what, "executor bug: missing deployment for a scored opportunity");
                    metrics.inc_executor_error(scored_opp.opp.kind());
                }
                Err(err) => {
                    tracing::error!(opportunity = ?scored_opp.opp, %err, "opportunity execution failed");
                    metrics.inc_executor_error(scored_opp.opp.kind());
                }
            }

            if let Err(err) = self.balances.force_update().await {
                tracing::warn!(%err, "balance force_update failed after executing an opportunity");
            }
        }
    }

    async fn execute_one(
        &self,
        opp: &Opportunity,
        deployments: &Deployments,
        chain_ids: &HashMap<&str, u64>,
        exposure: &mut NetExposureTracker,
    ) -> Result<(), LbfError> {
        let network = primary_network(opp);
        let pool = deployments.pool_address(network).ok_or_else(|| LbfError::MissingDeployment {
            network: network.to_string(),
            what: "pool".to_string(),
        })?;
        let client = self
            .clients
            .client(network)
            .ok_or_else(|| LbfError::NetworkNotActive(network.to_string()))?;

        if self.config.dry_run {
            tracing::info!(?opp, "dry run: not submitting transaction");
            return Ok(());
        }

        match opp {
            Opportunity::FillDeficit { to, amount } => {
                token_address(deployments, to, TokenKind::Usdc)?;
                self.balances.ensure_allowance(to, TokenKind::Usdc, pool, *amount).await?;
                let receipt = client.fill_deficit(pool, *amount, self.config.gas_limit).await?;
                if !receipt.success {
                    return Err(LbfError::RpcWriteFailed(format!("fillDeficit on {to} reverted")));
                }
            }
            Opportunity::TakeSurplus { on, amount } => {
                token_address(deployments, on, TokenKind::Iou)?;
                self.balances.ensure_allowance(on, TokenKind::Iou, pool, *amount).await?;
                let receipt = client.take_surplus(pool, *amount, self.config.gas_limit).await?;
                if !receipt.success {
                    return Err(LbfError::RpcWriteFailed(format!("takeSurplus on {on} reverted")));
                }
                exposure.record_redemption(*amount);
            }
            Opportunity::BridgeIou { from, to, amount } => {
                token_address(deployments, from, TokenKind::Iou)?;
                self.balances.ensure_allowance(from, TokenKind::Iou, pool, *amount).await?;
                let dest_chain_id = *chain_ids
                    .get(to.as_str())
                    .ok_or_else(|| LbfError::NotFound { kind: "network", key: to.clone() })?;
                let receipt = client.bridge_iou(pool, *amount, dest_chain_id, self.config.gas_limit).await?;
                if !receipt.success {
                    return Err(LbfError::RpcWriteFailed(format!("bridgeIOU from {from} reverted")));
                }
            }
        }
        Ok(())
    }
}

fn primary_network(opp: &Opportunity) -> &str {
    match opp {
        Opportunity::FillDeficit { to, .. } => to,
        Opportunity::TakeSurplus { on, .. } => on,
        Opportunity::BridgeIou { from, .. } => from,
    }
}

fn token_address(deployments: &Deployments, network: &str, kind: TokenKind) -> Result<alloy_primitives::Address, LbfError> {
    let map = match kind {
        TokenKind::Usdc => &deployments.usdc,
        TokenKind::Iou => &deployments.iou,
    };
    map.get(network).copied().ok_or_else(|| LbfError::MissingDeployment {
        network: network.to_string(),
        what: kind.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_primitives::{Address, U256},
        lbf_balances::BalanceTrackerConfig,
        lbf_chain_client::local::{FixedSignerRegistry, LocalChainClient, LocalChainClientDirectory},
        lbf_types::{NetworkMode, ParentPool},
        std::time::Duration,
        url::Url,
    };

    fn net(name: &str, chain_id: u64) -> Network {
        Network::new(name, chain_id, name, NetworkMode::Localhost, vec![Url::parse("http://localhost:8545").unwrap()])
    }

    #[tokio::test]
    async fn take_surplus_increments_total_redeemed_on_success() {
        let operator = Address::repeat_byte(0xAA);
        let pool_addr = Address::repeat_byte(0x01);
        let iou = Address::repeat_byte(0x02);

        let chain = LocalChainClient::new();
        chain.set_pool_data(pool_addr, U256::ZERO, U256::from(1_000_000u64));
        chain.set_balance(iou, operator, U256::from(1_000_000u64));
        chain.set_allowance(iou, Address::ZERO, pool_addr, U256::from(1_000_000u64));

        let mut directory = LocalChainClientDirectory::new();
        directory.insert("eth", chain.clone());
        let directory = Arc::new(directory);

        let (tracker, _rx) = BalanceTracker::new(
            directory.clone(),
            Arc::new(FixedSignerRegistry { operator }),
            BalanceTrackerConfig {
                update_interval: Duration::from_secs(3600),
                min_allowance_usdc: U256::ZERO,
                min_allowance_iou: U256::ZERO,
            },
        );

        let mut deployments = Deployments::default();
        deployments.parent_pool = Some(ParentPool { network: "eth".to_string(), address: pool_addr });
        deployments.iou.insert("eth".to_string(), iou);
        tracker.on_networks_updated(&[net("eth", 1)], &deployments).await.unwrap();

        let executor = Executor::new(directory, tracker, ExecutorConfig { gas_limit: 300_000, dry_run: false });
        let mut exposure = NetExposureTracker::new(U256::from(10_000_000u64));

        let scored = vec![ScoredOpportunity {
            opp: Opportunity::TakeSurplus { on: "eth".to_string(), amount: U256::from(1_000_000u64) },
            score: 200.0,
            feasible: true,
            reasons: vec![],
        }];
        executor.execute_batch(scored, &deployments, &[net("eth", 1)], &mut exposure).await;

        assert_eq!(exposure.total_redeemed_usdc(), U256::from(1_000_000u64));
    }

    #[tokio::test]
    async fn dry_run_does_not_submit_or_increment_redeemed() {
        let operator = Address::repeat_byte(0xAA);
        let pool_addr = Address::repeat_byte(0x01);
        let iou = Address::repeat_byte(0x02);

        let chain = LocalChainClient::new();
        let mut directory = LocalChainClientDirectory::new();
        directory.insert("eth", chain.clone());
        let directory = Arc::new(directory);

        let (tracker, _rx) = BalanceTracker::new(
            directory.clone(),
            Arc::new(FixedSignerRegistry { operator }),
            BalanceTrackerConfig {
                update_interval: Duration::from_secs(3600),
                min_allowance_usdc: U256::ZERO,
                min_allowance_iou: U256::ZERO,
            },
        );
        let mut deployments = Deployments::default();
        deployments.parent_pool = Some(ParentPool { network: "eth".to_string(), address: pool_addr });
        deployments.iou.insert("eth".to_string(), iou);
        tracker.on_networks_updated(&[net("eth", 1)], &deployments).await.unwrap();

        let executor = Executor::new(directory, tracker, ExecutorConfig { gas_limit: 300_000, dry_run: true });
        let mut exposure = NetExposureTracker::new(U256::from(10_000_000u64));
        let scored = vec![ScoredOpportunity {
            opp: Opportunity::TakeSurplus { on: "eth".to_string(), amount: U256::from(1_000_000u64) },
            score: 200.0,
            feasible: true,
            reasons: vec![],
        }];
        executor.execute_batch(scored, &deployments, &[net("eth", 1)], &mut exposure).await;

        assert_eq!(exposure.total_redeemed_usdc(), U256::ZERO);
        assert_eq!(chain.receipts_issued(), 0);
    }
}

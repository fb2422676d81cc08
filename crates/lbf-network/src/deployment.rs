//! Produces a consistent [`Deployments`] snapshot from either a pair of
//! remote manifests (`Mainnet`/`Testnet`) or a caller-provided static value
//! (`Localhost`).

use {
    lbf_chain_client::ManifestSource,
    lbf_config::patterns,
    lbf_types::{Deployments, LbfError, ParentPool},
    std::sync::Arc,
};

pub enum ManifestSources {
    Remote {
        pools: Arc<dyn ManifestSource>,
        tokens: Arc<dyn ManifestSource>,
    },
    Static(Deployments),
}

/// Produces a consistent [`Deployments`] snapshot, retaining the previous
/// one whenever a refresh fails.
pub struct DeploymentCoordinator {
    sources: ManifestSources,
    snapshot: Deployments,
}

impl DeploymentCoordinator {
    pub fn new(sources: ManifestSources) -> Self {
        let snapshot = match &sources {
            ManifestSources::Static(deployments) => deployments.clone(),
            ManifestSources::Remote { .. } => Deployments::default(),
        };
        Self { sources, snapshot }
    }

    pub fn snapshot(&self) -> Deployments {
        self.snapshot.clone()
    }

    /// Fetches both manifests in parallel (for `Remote` sources); either
    /// failing fails the whole refresh and leaves the previous snapshot in
    /// place. For `Static` sources this simply re-clones the fixed value.
    pub async fn refresh(&mut self) -> Result<Deployments, LbfError> {
        let deployments = match &self.sources {
            ManifestSources::Static(deployments) => deployments.clone(),
            ManifestSources::Remote { pools, tokens } => {
                let (pool_entries, token_entries) = tokio::try_join!(pools.fetch(), tokens.fetch())?;

                let mut deployments = Deployments::default();
                for (key, value, network) in pool_entries.into_iter().chain(token_entries) {
                    Self::apply_entry(&mut deployments, &key, &value, &network)?;
                }
                if deployments.parent_pool.is_none() {
                    return Err(LbfError::MissingParentPool);
                }
                deployments
            }
        };

        self.snapshot = deployments.clone();
        Ok(deployments)
    }

    fn apply_entry(
        deployments: &mut Deployments,
        key: &str,
        value: &str,
        network: &str,
    ) -> Result<(), LbfError> {
        let address = value
            .parse()
            .map_err(|_| LbfError::ManifestParseFailed(format!("invalid address {value:?} for key {key:?}")))?;

        if patterns::PARENT_POOL.is_match(key) {
            if let Some(existing) = &deployments.parent_pool {
                return Err(LbfError::DuplicateParentPool(
                    network.to_string(),
                    existing.network.clone(),
                ));
            }
            deployments.parent_pool = Some(ParentPool {
                network: network.to_string(),
                address,
            });
        } else if patterns::CHILD_POOL.is_match(key) {
            deployments.pools.insert(network.to_string(), address);
        } else if patterns::USDC.is_match(key) {
            deployments.usdc.insert(network.to_string(), address);
        } else if patterns::IOU.is_match(key) {
            deployments.iou.insert(network.to_string(), address);
        }
        Ok(())
    }
}

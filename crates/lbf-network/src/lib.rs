//! Network and deployment coordination: decides which chains are in scope
//! and which contract addresses apply, and fans out changes to listeners.

pub mod coordinator;
pub mod deployment;
pub mod registry;

pub use coordinator::{NetworkCoordinator, NetworkCoordinatorConfig, NetworkUpdateListener};
pub use deployment::{DeploymentCoordinator, ManifestSources};
pub use registry::{NetworkRegistry, StaticNetworkRegistry};

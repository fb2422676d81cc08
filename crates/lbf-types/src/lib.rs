//! Core data model shared by every component of the rebalancer: networks,
//! deployments, balances, pool data, and opportunities. Kept dependency-free
//! beyond `alloy-primitives`/`serde`/`thiserror`/`url` so every other crate
//! in the workspace can depend on it without pulling in async runtimes or
//! RPC clients.

pub mod decimal;
pub mod deployments;
pub mod error;
pub mod network;
pub mod opportunity;
pub mod pool;
pub mod token;

pub use alloy_primitives::{Address, U256};
pub use deployments::{Deployments, ParentPool};
pub use error::LbfError;
pub use network::{Network, NetworkMode};
pub use opportunity::{Opportunity, ScoredOpportunity};
pub use pool::PoolData;
pub use token::{TokenBalance, TokenKind};

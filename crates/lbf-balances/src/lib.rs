//! Operator balance tracking and allowance management, per chain per asset.

pub mod event;
pub mod tracker;

pub use event::BalanceEvent;
pub use tracker::{BalanceTracker, BalanceTrackerConfig};

//! Discovery, scoring, and execution of rebalancing opportunities — the
//! heart of the system, invoked on every pool update.

pub mod discoverer;
pub mod executor;
pub mod exposure;
pub mod scorer;

pub use discoverer::{discover, DiscovererConfig};
pub use executor::{Executor, ExecutorConfig};
pub use exposure::NetExposureTracker;
pub use scorer::{score, ScorerConfig};

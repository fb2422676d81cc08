//! Streams `(network, deficit, surplus)` pool-data updates to the core.

pub mod event;
pub mod observer;

pub use event::{PoolEvent, PoolUpdate};
pub use observer::{PoolObserver, PoolObserverConfig};

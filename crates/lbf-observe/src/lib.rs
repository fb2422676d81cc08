pub mod metrics;
pub mod registry;
pub mod server;
pub mod tracing_setup;

pub use metrics::{AtomicLiveness, LivenessChecking};
pub use tracing_setup::init as init_tracing;

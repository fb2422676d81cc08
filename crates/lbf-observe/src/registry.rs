//! A single process-wide Prometheus registry, mirroring the teacher's
//! `global-metrics` crate. Components register their
//! `#[derive(MetricStorage)]` structs against it once, at construction.

use once_cell::sync::Lazy;

static REGISTRY: Lazy<prometheus::Registry> = Lazy::new(prometheus::Registry::new);

pub fn get_metric_storage_registry() -> &'static prometheus::Registry {
    &REGISTRY
}

use {
    alloy_primitives::U256,
    crate::registry::get_metric_storage_registry,
    prometheus::{Encoder, IntCounterVec, IntGauge},
};

/// Process-wide gauges/counters for the core loop. One cycle of
/// discover→score→execute updates all of these.
#[derive(prometheus_metric_storage::MetricStorage)]
pub struct Metrics {
    /// Number of networks currently in the active set.
    pub active_networks: IntGauge,

    /// Number of live per-(network, token) balance watchers.
    pub balance_watchers: IntGauge,

    /// Opportunities discovered, scored, or executed, labelled by
    /// opportunity kind and outcome.
    #[metric(labels("kind", "stage"))]
    pub opportunities: IntCounterVec,

    /// Monotone counter of USDC redeemed against surplus pools.
    pub total_redeemed_usdc: IntGauge,

    /// Executor failures that did not abort the batch.
    #[metric(labels("kind"))]
    pub executor_errors: IntCounterVec,
}

impl Metrics {
    pub fn set_active_networks(&self, count: usize) {
        self.active_networks.set(count as i64);
    }

    pub fn set_balance_watchers(&self, count: usize) {
        self.balance_watchers.set(count as i64);
    }

    pub fn inc_opportunities(&self, kind: &str, stage: &str) {
        self.opportunities.with_label_values(&[kind, stage]).inc();
    }

    /// Gauges only display base-unit amounts; this is the sole place a
    /// `U256` is narrowed to an `i64` for Prometheus export, not a
    /// reconversion of monetary state for decision-making.
    pub fn set_total_redeemed_usdc(&self, amount: U256) {
        let clamped: u64 = amount.try_into().unwrap_or(u64::MAX);
        self.total_redeemed_usdc.set(clamped.min(i64::MAX as u64) as i64);
    }

    pub fn inc_executor_error(&self, kind: &str) {
        self.executor_errors.with_label_values(&[kind]).inc();
    }
}

pub fn metrics() -> &'static Metrics {
    Metrics::instance(get_metric_storage_registry()).expect("metric registration")
}

/// Liveness is reported `true` once the core event loop has processed its
/// first tick. Kept deliberately simple — no deep health probing, matching
/// the teacher's trivial `Liveness` impl in `autopilot`.
pub trait LivenessChecking: Send + Sync {
    fn is_alive(&self) -> bool;
}

/// A `LivenessChecking` impl the core event loop flips once, after
/// processing its first event.
#[derive(Default)]
pub struct AtomicLiveness(std::sync::atomic::AtomicBool);

impl AtomicLiveness {
    pub fn set_alive(&self, alive: bool) {
        self.0.store(alive, std::sync::atomic::Ordering::Relaxed);
    }
}

impl LivenessChecking for AtomicLiveness {
    fn is_alive(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::Relaxed)
    }
}

pub fn render_prometheus_text() -> String {
    let encoder = prometheus::TextEncoder::new();
    let mut buf = Vec::new();
    let _ = encoder.encode(&get_metric_storage_registry().gather(), &mut buf);
    String::from_utf8(buf).unwrap_or_default()
}

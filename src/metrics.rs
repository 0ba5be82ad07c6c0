//! Prometheus exposition of the published snapshot.
//!
//! The `dir_size_bytes` family is not a long-lived `GaugeVec` that the
//! refresh loop resets and refills. [`DirSizeCollector`] renders a fresh
//! family from a single [`MetricStore::read`] on every gather, so a scrape
//! always reflects exactly one published snapshot.

use std::time::Duration;

use chrono::{DateTime, Utc};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::error;

use crate::storage::MetricStore;

pub const DIR_SIZE_METRIC: &str = "dir_size_bytes";
pub const DIR_LABEL: &str = "dir";

const RESULT_SUCCESS: &str = "success";
const RESULT_FAILURE: &str = "failure";

fn dir_size_opts() -> Opts {
    Opts::new(DIR_SIZE_METRIC, "Directory size in bytes")
}

/// Renders the store's current snapshot as the `dir_size_bytes` gauge family.
pub struct DirSizeCollector {
    store: MetricStore,
    /// Only used to describe the family at registration time.
    template: GaugeVec,
}

impl DirSizeCollector {
    pub fn new(store: MetricStore) -> prometheus::Result<Self> {
        let template = GaugeVec::new(dir_size_opts(), &[DIR_LABEL])?;
        Ok(Self { store, template })
    }
}

impl Collector for DirSizeCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.template.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let snapshot = self.store.read();
        let gauges = match GaugeVec::new(dir_size_opts(), &[DIR_LABEL]) {
            Ok(gauges) => gauges,
            Err(e) => {
                error!(error = %e, "failed to build {DIR_SIZE_METRIC} family");
                return Vec::new();
            }
        };
        for (label, size) in snapshot.entries() {
            gauges.with_label_values(&[label.as_str()]).set(*size as f64);
        }
        gauges.collect()
    }
}

/// Bookkeeping about refresh attempts, updated by the refresh loop.
#[derive(Clone)]
pub struct RefreshMetrics {
    outcomes: IntCounterVec,
    last_success: Gauge,
    duration: Gauge,
}

impl RefreshMetrics {
    fn new() -> prometheus::Result<Self> {
        let outcomes = IntCounterVec::new(
            Opts::new(
                "dir_size_refresh_total",
                "Refresh attempts by result (success or failure)",
            ),
            &["result"],
        )?;
        // Export both series from the start so rate() works before the first failure.
        outcomes.with_label_values(&[RESULT_SUCCESS]);
        outcomes.with_label_values(&[RESULT_FAILURE]);

        let last_success = Gauge::new(
            "dir_size_last_success_timestamp_seconds",
            "Unix time of the last successful refresh, 0 if none yet",
        )?;
        let duration = Gauge::new(
            "dir_size_refresh_duration_seconds",
            "Wall time of the most recent refresh attempt",
        )?;

        Ok(Self {
            outcomes,
            last_success,
            duration,
        })
    }

    fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.outcomes.clone()))?;
        registry.register(Box::new(self.last_success.clone()))?;
        registry.register(Box::new(self.duration.clone()))?;
        Ok(())
    }

    pub fn record_success(&self, elapsed: Duration, at: DateTime<Utc>) {
        self.outcomes.with_label_values(&[RESULT_SUCCESS]).inc();
        self.last_success.set(at.timestamp_millis() as f64 / 1000.0);
        self.duration.set(elapsed.as_secs_f64());
    }

    pub fn record_failure(&self, elapsed: Duration) {
        self.outcomes.with_label_values(&[RESULT_FAILURE]).inc();
        self.duration.set(elapsed.as_secs_f64());
    }

    #[cfg(test)]
    pub fn successes(&self) -> u64 {
        self.outcomes.with_label_values(&[RESULT_SUCCESS]).get()
    }

    #[cfg(test)]
    pub fn failures(&self) -> u64 {
        self.outcomes.with_label_values(&[RESULT_FAILURE]).get()
    }

    /// Total refresh attempts, successful or not.
    #[cfg(test)]
    pub fn attempts(&self) -> u64 {
        self.successes() + self.failures()
    }
}

/// Registry holding everything the `/metrics` endpoint serves.
pub struct Metrics {
    registry: Registry,
    refresh: RefreshMetrics,
}

impl Metrics {
    pub fn new(store: MetricStore) -> prometheus::Result<Self> {
        let registry = Registry::new();
        registry.register(Box::new(DirSizeCollector::new(store)?))?;
        let refresh = RefreshMetrics::new()?;
        refresh.register(&registry)?;
        Ok(Self { registry, refresh })
    }

    pub fn refresh(&self) -> RefreshMetrics {
        self.refresh.clone()
    }

    /// Encodes all families in the Prometheus text format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

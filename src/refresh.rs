//! Periodic refresh: scan the data root, publish the snapshot, sleep, repeat.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::collector::{FileSystem, ScanError, SnapshotBuilder};
use crate::metrics::RefreshMetrics;
use crate::storage::MetricStore;
use crate::util::format_size;

/// Drives refresh cycles at a fixed interval.
///
/// A failed cycle leaves the published snapshot untouched and is retried on
/// the next tick; the loop only ends on shutdown. A scan that hangs (slow or
/// stuck filesystem) holds up every following tick until it returns.
pub struct RefreshLoop<F: FileSystem> {
    builder: SnapshotBuilder<F>,
    root: PathBuf,
    store: MetricStore,
    metrics: RefreshMetrics,
    interval: Duration,
}

impl<F: FileSystem + 'static> RefreshLoop<F> {
    pub fn new(
        fs: F,
        root: impl Into<PathBuf>,
        store: MetricStore,
        metrics: RefreshMetrics,
        interval: Duration,
    ) -> Self {
        Self {
            builder: SnapshotBuilder::new(fs),
            root: root.into(),
            store,
            metrics,
            interval,
        }
    }

    /// Runs one refresh cycle synchronously.
    pub fn tick(&self) -> Result<(), ScanError> {
        let t0 = Instant::now();
        match self.builder.build(&self.root) {
            Ok(snapshot) => {
                let elapsed = t0.elapsed();
                let taken_at = snapshot.taken_at().unwrap_or_else(Utc::now);
                info!(
                    sizes = ?snapshot.entries(),
                    dirs = snapshot.len(),
                    total = %format_size(snapshot.total()),
                    duration_ms = elapsed.as_millis() as u64,
                    "refreshed"
                );
                self.store.replace(snapshot);
                self.metrics.record_success(elapsed, taken_at);
                Ok(())
            }
            Err(e) => {
                self.metrics.record_failure(t0.elapsed());
                warn!(error = %e, kind = e.kind(), root = %self.root.display(), "refresh failed");
                Err(e)
            }
        }
    }

    /// Ticks every `interval` until `shutdown` flips to `true` or its sender
    /// is dropped. The first tick fires immediately.
    ///
    /// Each scan runs on the blocking pool and is awaited to completion; a
    /// shutdown request only takes effect between scans.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let interval = self.interval;
        let this = Arc::new(self);

        let mut tick = tokio::time::interval(interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            root = %this.root.display(),
            interval_s = interval.as_secs_f64(),
            "starting refresh loop"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = tick.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let worker = this.clone();
            let t0 = Instant::now();
            let result = tokio::task::spawn_blocking(move || worker.tick()).await;
            let elapsed = t0.elapsed();

            match result {
                Ok(Ok(())) => debug!(duration_ms = elapsed.as_millis() as u64, "tick completed"),
                // Already logged inside tick().
                Ok(Err(_)) => {}
                Err(e) => error!(error = %e, "refresh panicked in spawn_blocking"),
            }

            if elapsed > interval / 2 {
                warn!(
                    duration_ms = elapsed.as_millis() as u64,
                    interval_ms = interval.as_millis() as u64,
                    "refresh exceeded 50% of interval"
                );
            }
        }

        info!("refresh loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockFs;
    use crate::metrics::Metrics;

    fn setup(fs: MockFs, interval: Duration) -> (RefreshLoop<MockFs>, MetricStore, Metrics) {
        let store = MetricStore::new();
        let metrics = Metrics::new(store.clone()).unwrap();
        let refresh = RefreshLoop::new(fs, "/data", store.clone(), metrics.refresh(), interval);
        (refresh, store, metrics)
    }

    #[test]
    fn successful_tick_publishes_snapshot() {
        let (refresh, store, metrics) = setup(MockFs::data_dir(), Duration::from_secs(5));

        refresh.tick().unwrap();

        let snapshot = store.read();
        assert_eq!(snapshot.get("/data/logs"), Some(100));
        assert_eq!(snapshot.get("/data/cache"), Some(200));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(metrics.refresh().successes(), 1);
    }

    #[test]
    fn failed_tick_keeps_previous_snapshot() {
        let fs = MockFs::data_dir();
        let (refresh, store, metrics) = setup(fs.clone(), Duration::from_secs(5));
        refresh.tick().unwrap();
        let before = store.read();

        fs.add_file("/data/cache/more.bin", 1_000);
        fs.deny("/data/cache/nested");
        let err = refresh.tick().unwrap_err();
        assert_eq!(err.kind(), "traversal");

        let after = store.read();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.get("/data/cache"), Some(200));
        assert_eq!(metrics.refresh().failures(), 1);

        fs.allow("/data/cache/nested");
        refresh.tick().unwrap();
        assert_eq!(store.read().get("/data/cache"), Some(1_200));
    }

    #[test]
    fn deleted_root_fails_with_list_error_and_recovers() {
        let fs = MockFs::data_dir();
        let (refresh, store, _metrics) = setup(fs.clone(), Duration::from_secs(5));
        refresh.tick().unwrap();

        fs.remove("/data");
        let err = refresh.tick().unwrap_err();
        assert!(matches!(err, ScanError::List { .. }));
        assert_eq!(store.read().len(), 2);

        fs.add_file("/data/fresh/x", 9);
        refresh.tick().unwrap();
        let snapshot = store.read();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("/data/fresh"), Some(9));
    }

    #[test]
    fn failure_before_first_success_leaves_store_empty() {
        let fs = MockFs::new();
        let (refresh, store, _metrics) = setup(fs, Duration::from_secs(5));
        assert!(refresh.tick().is_err());
        assert!(store.read().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn loop_keeps_ticking() {
        let interval = Duration::from_millis(100);
        let (refresh, store, metrics) = setup(MockFs::data_dir(), interval);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(refresh.run(rx));
        tokio::time::sleep(interval * 3).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(metrics.refresh().attempts() >= 2);
        assert_eq!(store.read().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn loop_survives_failures_and_stops_when_sender_dropped() {
        let interval = Duration::from_millis(50);
        let fs = MockFs::data_dir();
        fs.deny("/data");
        let (refresh, store, metrics) = setup(fs.clone(), interval);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(refresh.run(rx));
        tokio::time::sleep(interval * 3).await;
        assert!(metrics.refresh().failures() >= 2);
        assert!(store.read().is_empty());

        fs.allow("/data");
        tokio::time::sleep(interval * 3).await;
        assert_eq!(store.read().len(), 2);

        drop(tx);
        handle.await.unwrap();
    }
}

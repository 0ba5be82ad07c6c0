use std::sync::{Arc, PoisonError, RwLock};

use super::snapshot::Snapshot;

/// Holder of the currently published snapshot.
///
/// Cloning is cheap and every clone sees the same published snapshot. The
/// refresh loop owns one clone for writing, the metrics endpoint another
/// for reading.
///
/// Publishing swaps a single `Arc` under the lock: a reader either gets the
/// old snapshot or the new one, never a mix and never an empty in-between.
/// Readers only hold the lock for the duration of an `Arc` clone.
#[derive(Debug, Clone, Default)]
pub struct MetricStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl MetricStore {
    /// Creates a store publishing the empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the published snapshot.
    pub fn replace(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        // A poisoned lock still holds a whole Arc; the swap cannot be torn.
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }

    /// Returns the currently published snapshot.
    pub fn read(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Full path of a scanned subdirectory.
pub type DirectoryLabel = String;

/// Byte count.
pub type ByteSize = u64;

/// Point-in-time sizes of every top-level subdirectory.
///
/// Built once by a refresh cycle and never mutated afterwards; the store
/// shares it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<DirectoryLabel, ByteSize>,
    /// When the scan that produced this snapshot finished. `None` for the
    /// empty snapshot published at startup.
    taken_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(entries: BTreeMap<DirectoryLabel, ByteSize>, taken_at: DateTime<Utc>) -> Self {
        Self {
            entries,
            taken_at: Some(taken_at),
        }
    }

    pub fn entries(&self) -> &BTreeMap<DirectoryLabel, ByteSize> {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<ByteSize> {
        self.entries.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        self.taken_at
    }

    pub fn total(&self) -> ByteSize {
        self.entries
            .values()
            .fold(0, |acc: ByteSize, v| acc.saturating_add(*v))
    }
}

impl FromIterator<(DirectoryLabel, ByteSize)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (DirectoryLabel, ByteSize)>>(iter: I) -> Self {
        Snapshot::new(iter.into_iter().collect(), Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty_and_untimed() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total(), 0);
        assert!(snapshot.taken_at().is_none());
    }

    #[test]
    fn collects_entries_and_totals() {
        let snapshot: Snapshot = [
            ("/data/logs".to_string(), 100),
            ("/data/cache".to_string(), 200),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("/data/cache"), Some(200));
        assert_eq!(snapshot.get("/data/missing"), None);
        assert_eq!(snapshot.total(), 300);
        assert!(snapshot.taken_at().is_some());
    }
}

//! Builds a [`Snapshot`] of every immediate subdirectory of the data root.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, trace};

use super::error::ScanError;
use super::traits::FileSystem;
use super::walker::SizeWalker;
use crate::storage::Snapshot;

/// Produces snapshots of the data root with all-or-nothing semantics.
pub struct SnapshotBuilder<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> SnapshotBuilder<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Scans `root` and returns one entry per immediate subdirectory.
    ///
    /// Non-directory children (files, symlinks, special files) are skipped
    /// on the kind reported by the listing, without a stat, so a loose file
    /// removed mid-scan cannot fail the build. Fails with [`ScanError::List`] if `root` cannot be listed and with
    /// [`ScanError::Traversal`] if any subdirectory cannot be sized; in
    /// either case no snapshot is produced.
    ///
    /// Keys are absolute paths. A relative `root` is resolved against the
    /// current working directory.
    pub fn build(&self, root: &Path) -> Result<Snapshot, ScanError> {
        let root = std::path::absolute(root).map_err(|source| ScanError::List {
            path: root.to_path_buf(),
            source,
        })?;

        let mut children = self
            .fs
            .read_dir(&root)
            .map_err(|source| ScanError::List {
                path: root.clone(),
                source,
            })?;
        children.sort();

        let walker = SizeWalker::new(&self.fs);
        let mut entries = BTreeMap::new();

        for child in children {
            if !child.is_dir() {
                trace!(path = %child.path.display(), kind = ?child.kind, "skipping non-directory");
                continue;
            }
            let size = walker.compute_size(&child.path)?;
            debug!(dir = %child.path.display(), size, "sized directory");
            entries.insert(child.path.to_string_lossy().into_owned(), size);
        }

        Ok(Snapshot::new(entries, Utc::now()))
    }
}

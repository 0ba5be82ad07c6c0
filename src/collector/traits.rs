//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the size walker to run against the real
//! data directory or against an in-memory tree with injected failures.

use std::io;
use std::path::{Path, PathBuf};

/// What a directory entry is, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    /// Sockets, fifos, device nodes.
    Other,
}

/// Metadata of a single entry, taken without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub kind: EntryKind,
    /// Apparent size in bytes.
    pub len: u64,
}

impl EntryMeta {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A directory listing entry. `kind` comes from the listing itself, so
/// callers can skip non-directories without a separate stat.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

impl EntryKind {
    fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// Abstraction for filesystem operations.
///
/// Implementations must be shareable across threads: the scan runs on the
/// blocking pool while the server keeps serving.
pub trait FileSystem: Send + Sync {
    /// Lists entries in a directory.
    ///
    /// # Returns
    /// The direct children, each with its full path (`path` joined with the
    /// name) and the kind reported by the listing, or an I/O error if the
    /// directory cannot be listed.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Returns metadata for `path` without following a trailing symlink.
    fn symlink_metadata(&self, path: &Path) -> io::Result<EntryMeta>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let entries = std::fs::read_dir(path)?;
        let mut children = Vec::new();
        for entry in entries {
            let entry = entry?;
            // d_type on Linux; no extra stat unless the filesystem omits it
            let kind = EntryKind::from_file_type(entry.file_type()?);
            children.push(DirEntry {
                path: entry.path(),
                kind,
            });
        }
        Ok(children)
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        let meta = std::fs::symlink_metadata(path)?;
        Ok(EntryMeta {
            kind: EntryKind::from_file_type(meta.file_type()),
            len: meta.len(),
        })
    }
}

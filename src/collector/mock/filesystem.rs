//! In-memory mock filesystem for testing the walker without a real disk.
//!
//! `MockFs` stores file sizes rather than contents, and can be told to make
//! individual paths unreadable or to drop whole subtrees, which is how tests
//! simulate permission errors and directories removed between refreshes.

use crate::collector::traits::{DirEntry, EntryKind, EntryMeta, FileSystem};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tree {
    /// Map from path to file size.
    files: HashMap<PathBuf, u64>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    symlinks: HashSet<PathBuf>,
    /// Paths that exist but fail every access with `PermissionDenied`.
    denied: HashSet<PathBuf>,
}

impl Tree {
    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn check_access(&self, path: &Path) -> io::Result<()> {
        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        Ok(())
    }
}

/// In-memory filesystem for testing.
///
/// Clones share the same tree, so a test can hand one clone to a refresh
/// loop and keep mutating the other between ticks.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    tree: Arc<RwLock<Tree>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a regular file of `len` bytes.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&self, path: impl AsRef<Path>, len: u64) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.write();
        tree.add_parents(&path);
        tree.files.insert(path, len);
    }

    /// Adds an empty directory.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.write();
        tree.add_parents(&path);
        tree.directories.insert(path);
    }

    /// Adds a symlink entry. Its target is irrelevant: the walker never follows it.
    pub fn add_symlink(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.write();
        tree.add_parents(&path);
        tree.symlinks.insert(path);
    }

    /// Makes `path` fail every subsequent access with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.write().denied.insert(path.as_ref().to_path_buf());
    }

    /// Undoes a previous [`MockFs::deny`].
    pub fn allow(&self, path: impl AsRef<Path>) {
        self.write().denied.remove(path.as_ref());
    }

    /// Removes `path` and everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut tree = self.write();
        tree.files.retain(|p, _| !p.starts_with(path));
        tree.directories.retain(|p| !p.starts_with(path));
        tree.symlinks.retain(|p| !p.starts_with(path));
    }
}

impl FileSystem for MockFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let tree = self.read();
        tree.check_access(path)?;
        if !tree.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let is_child = |p: &Path| p.parent().is_some_and(|parent| parent == path);
        let entry = |p: &PathBuf, kind| DirEntry {
            path: p.clone(),
            kind,
        };

        let mut entries: Vec<DirEntry> = Vec::new();
        entries.extend(
            tree.files
                .keys()
                .filter(|p| is_child(p.as_path()))
                .map(|p| entry(p, EntryKind::File)),
        );
        entries.extend(
            tree.directories
                .iter()
                .filter(|p| is_child(p.as_path()) && p.as_path() != path)
                .map(|p| entry(p, EntryKind::Dir)),
        );
        entries.extend(
            tree.symlinks
                .iter()
                .filter(|p| is_child(p.as_path()))
                .map(|p| entry(p, EntryKind::Symlink)),
        );

        Ok(entries)
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        let tree = self.read();
        tree.check_access(path)?;
        if let Some(&len) = tree.files.get(path) {
            return Ok(EntryMeta {
                kind: EntryKind::File,
                len,
            });
        }
        if tree.directories.contains(path) {
            return Ok(EntryMeta {
                kind: EntryKind::Dir,
                len: 4096,
            });
        }
        if tree.symlinks.contains(path) {
            return Ok(EntryMeta {
                kind: EntryKind::Symlink,
                len: 64,
            });
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such entry: {:?}", path),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let fs = MockFs::new();
        fs.add_file("/data/logs/app.log", 100);

        let meta = fs.symlink_metadata(Path::new("/data/logs/app.log")).unwrap();
        assert_eq!(meta.kind, EntryKind::File);
        assert_eq!(meta.len, 100);
        let logs = fs.symlink_metadata(Path::new("/data/logs")).unwrap();
        assert_eq!(logs.kind, EntryKind::Dir);
        assert_eq!(
            fs.symlink_metadata(Path::new("/data")).unwrap().kind,
            EntryKind::Dir
        );
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let fs = MockFs::new();
        fs.add_file("/data/a/1", 1);
        fs.add_file("/data/a/2", 2);
        fs.add_file("/data/b/1", 3);
        fs.add_symlink("/data/link");

        let mut root = fs.read_dir(Path::new("/data")).unwrap();
        root.sort();
        let kinds: Vec<EntryKind> = root.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EntryKind::Dir, EntryKind::Dir, EntryKind::Symlink]);
        assert_eq!(root[2].path, Path::new("/data/link"));

        let a = fs.read_dir(Path::new("/data/a")).unwrap();
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_mock_fs_deny_and_allow() {
        let fs = MockFs::new();
        fs.add_file("/data/secret/key", 10);
        fs.deny("/data/secret");

        let err = fs.read_dir(Path::new("/data/secret")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

        fs.allow("/data/secret");
        assert_eq!(fs.read_dir(Path::new("/data/secret")).unwrap().len(), 1);
    }

    #[test]
    fn test_mock_fs_remove_subtree_is_shared_between_clones() {
        let fs = MockFs::new();
        fs.add_file("/data/cache/x", 5);
        let other = fs.clone();

        other.remove("/data");

        let err = fs.read_dir(Path::new("/data")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(fs.symlink_metadata(Path::new("/data/cache/x")).is_err());
    }
}

//! Recursive size computation for a single directory.

use std::path::{Path, PathBuf};

use super::error::ScanError;
use super::traits::{EntryKind, FileSystem};
use crate::storage::ByteSize;

/// Sums the apparent size of every regular file below a directory.
///
/// Entry kinds come from the directory listing, and only regular files are
/// stat'ed for their length. Symlinks are their own kind and are never
/// followed, so a link pointing back up the tree cannot make the walk loop.
/// Directories, symlinks and special files contribute zero bytes.
pub struct SizeWalker<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
}

impl<'a, F: FileSystem + ?Sized> SizeWalker<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Computes the total size of `dir`.
    ///
    /// Any unreadable entry aborts the whole computation with
    /// [`ScanError::Traversal`]; no partial sum is ever returned.
    pub fn compute_size(&self, dir: &Path) -> Result<ByteSize, ScanError> {
        let traversal = |path: &Path, source| ScanError::Traversal {
            dir: dir.to_path_buf(),
            path: path.to_path_buf(),
            source,
        };

        let mut total: ByteSize = 0;
        let mut pending: Vec<PathBuf> = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let children = self
                .fs
                .read_dir(&current)
                .map_err(|e| traversal(current.as_path(), e))?;

            for child in children {
                match child.kind {
                    EntryKind::Dir => pending.push(child.path),
                    EntryKind::File => {
                        let meta = self
                            .fs
                            .symlink_metadata(&child.path)
                            .map_err(|e| traversal(child.path.as_path(), e))?;
                        // replaced by a link or directory since the listing
                        if meta.is_file() {
                            total = total.saturating_add(meta.len);
                        }
                    }
                    EntryKind::Symlink | EntryKind::Other => {}
                }
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockFs, RealFs};
    use std::fs;

    #[test]
    fn sums_nested_files() {
        let fs = MockFs::data_dir();
        let walker = SizeWalker::new(&fs);
        assert_eq!(walker.compute_size(Path::new("/data/cache")).unwrap(), 200);
        assert_eq!(walker.compute_size(Path::new("/data/logs")).unwrap(), 100);
    }

    #[test]
    fn whole_tree_includes_loose_files() {
        let fs = MockFs::data_dir();
        assert_eq!(
            SizeWalker::new(&fs).compute_size(Path::new("/data")).unwrap(),
            307
        );
    }

    #[test]
    fn empty_directory_is_zero() {
        let fs = MockFs::mixed_tree();
        assert_eq!(
            SizeWalker::new(&fs).compute_size(Path::new("/srv/empty")).unwrap(),
            0
        );
    }

    #[test]
    fn symlinks_and_directories_contribute_nothing() {
        let fs = MockFs::mixed_tree();
        assert_eq!(
            SizeWalker::new(&fs).compute_size(Path::new("/srv/media")).unwrap(),
            3_800_000
        );
    }

    #[test]
    fn unreadable_entry_aborts_walk() {
        let fs = MockFs::data_dir();
        fs.deny("/data/cache/nested");

        let err = SizeWalker::new(&fs)
            .compute_size(Path::new("/data/cache"))
            .unwrap_err();
        match err {
            ScanError::Traversal { dir, path, source } => {
                assert_eq!(dir, Path::new("/data/cache"));
                assert_eq!(path, Path::new("/data/cache/nested"));
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn vanished_file_aborts_walk() {
        let fs = MockFs::data_dir();
        fs.deny("/data/cache/a.bin");

        let err = SizeWalker::new(&fs)
            .compute_size(Path::new("/data/cache"))
            .unwrap_err();
        assert!(
            matches!(err, ScanError::Traversal { ref path, .. } if path == Path::new("/data/cache/a.bin"))
        );
    }

    #[test]
    fn missing_directory_is_traversal_error() {
        let fs = MockFs::data_dir();
        let err = SizeWalker::new(&fs)
            .compute_size(Path::new("/data/gone"))
            .unwrap_err();
        assert_eq!(err.kind(), "traversal");
    }

    #[test]
    fn real_tree_matches_written_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::write(root.join("top.bin"), vec![1u8; 10]).unwrap();
        fs::write(root.join("a/one.bin"), vec![1u8; 20]).unwrap();
        fs::write(root.join("a/b/two.bin"), vec![1u8; 30]).unwrap();
        fs::write(root.join("a/b/c/three.bin"), vec![1u8; 40]).unwrap();

        let size = SizeWalker::new(&RealFs::new()).compute_size(root).unwrap();
        assert_eq!(size, 100);
    }

    #[cfg(unix)]
    #[test]
    fn real_tree_with_symlink_cycle_terminates() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("inner")).unwrap();
        fs::write(root.join("inner/f"), vec![0u8; 5]).unwrap();
        std::os::unix::fs::symlink(root, root.join("inner/back")).unwrap();

        let size = SizeWalker::new(&RealFs::new()).compute_size(root).unwrap();
        assert_eq!(size, 5);
    }
}

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why a refresh cycle could not produce a snapshot.
#[derive(Debug)]
pub enum ScanError {
    /// The data directory itself could not be listed.
    List { path: PathBuf, source: io::Error },
    /// A subdirectory could not be walked completely.
    ///
    /// `dir` is the directory being sized, `path` the entry that failed.
    Traversal {
        dir: PathBuf,
        path: PathBuf,
        source: io::Error,
    },
}

impl ScanError {
    /// Short machine-friendly name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::List { .. } => "list",
            ScanError::Traversal { .. } => "traversal",
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::List { path, source } => {
                write!(f, "cannot list {}: {}", path.display(), source)
            }
            ScanError::Traversal { dir, path, source } => write!(
                f,
                "cannot walk {} (at {}): {}",
                dir.display(),
                path.display(),
                source
            ),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::List { source, .. } | ScanError::Traversal { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_mentions_paths_and_cause() {
        let err = ScanError::Traversal {
            dir: PathBuf::from("/data/cache"),
            path: PathBuf::from("/data/cache/locked"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/cache"));
        assert!(msg.contains("/data/cache/locked"));
        assert!(msg.contains("denied"));
        assert_eq!(err.kind(), "traversal");
        assert!(err.source().is_some());
    }

    #[test]
    fn list_error_kind() {
        let err = ScanError::List {
            path: PathBuf::from("/data"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.kind(), "list");
        assert!(err.to_string().starts_with("cannot list /data"));
    }
}

//! Directory size collection.
//!
//! ```text
//! SnapshotBuilder ── lists the data root, skips non-directories
//!        │
//!        ▼
//!   SizeWalker ───── sums regular files below one subdirectory
//!        │
//!        ▼
//!   FileSystem (trait)
//!     ├── RealFs   std::fs
//!     └── MockFs   in-memory, fault injection
//! ```
//!
//! # Usage
//!
//! ```
//! use std::path::Path;
//! use dirsize_exporter::collector::{MockFs, SnapshotBuilder};
//!
//! let builder = SnapshotBuilder::new(MockFs::data_dir());
//! let snapshot = builder.build(Path::new("/data")).unwrap();
//! assert_eq!(snapshot.get("/data/cache"), Some(200));
//! ```

mod error;
pub mod mock;
mod snapshot;
pub mod traits;
mod walker;

pub use error::ScanError;
pub use mock::MockFs;
pub use snapshot::SnapshotBuilder;
pub use traits::{DirEntry, EntryKind, EntryMeta, FileSystem, RealFs};
pub use walker::SizeWalker;

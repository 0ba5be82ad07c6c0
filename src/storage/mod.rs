//! In-memory snapshot storage.
//!
//! A refresh cycle produces an immutable [`Snapshot`]; the [`MetricStore`]
//! holds the one currently published and hands it out to scrapes.

mod snapshot;
mod store;

pub use snapshot::{ByteSize, DirectoryLabel, Snapshot};
pub use store::MetricStore;

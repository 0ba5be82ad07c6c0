//! dirsize-exporter - disk usage of top-level subdirectories as Prometheus gauges.
//!
//! A refresh loop periodically walks every immediate subdirectory of the
//! data directory, sums the sizes of the files below it, and publishes the
//! result as one immutable snapshot. The `/metrics` endpoint renders whatever
//! snapshot is published at scrape time.

pub mod app;
pub mod collector;
pub mod config;
pub mod metrics;
pub mod refresh;
pub mod server;
pub mod storage;
pub mod util;

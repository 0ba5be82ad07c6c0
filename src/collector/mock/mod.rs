//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for testing the
//! size walker and snapshot builder without touching a real disk.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;

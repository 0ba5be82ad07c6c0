//! Utility modules.

mod size;

pub use size::format_size;

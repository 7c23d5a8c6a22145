//! Tabular export schema handling
//!
//! This module reads loosely-structured behavioral exports (CSV/TSV) and
//! resolves which cells carry time, behavior, status, fps, duration and media
//! information.

mod detector;
mod table;

pub use detector::*;
pub use table::*;

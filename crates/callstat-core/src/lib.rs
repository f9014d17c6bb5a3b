//! Core types, traits, and utilities for callstat
//!
//! This crate provides the foundational types, error handling, timezone
//! configuration and the collaborator traits (metrics source, metrics sink,
//! checkpoint store, clock) shared by all other callstat crates.

pub mod checkpoint;
pub mod clock;
pub mod error;
pub mod metric;
pub mod sink;
pub mod source;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{CallstatError, Result};
pub use metric::{MetricRecord, MetricValue};
pub use types::{DailyDate, ISOTimestamp};

//! Error types for callstat
//!
//! This module defines the error types used throughout the callstat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use callstat_core::error::{CallstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to CallstatError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for callstat operations
///
/// Collaborator failures (source, sink, checkpoint store) each get their own
/// variant so the driver can report which side of a run broke.
#[derive(Error, Debug)]
pub enum CallstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The metrics source failed to answer a query
    #[error("Metrics source error: {0}")]
    Source(String),

    /// The metrics sink rejected a submission
    #[error("Metrics sink error: {0}")]
    Sink(String),

    /// The checkpoint store could not be read or written
    #[error("Checkpoint store error: {0}")]
    Checkpoint(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results in callstat
///
/// # Example
///
/// ```
/// use callstat_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, CallstatError>;

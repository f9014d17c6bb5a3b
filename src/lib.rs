//! callstat - Report telephony account usage to a metrics backend
//!
//! This library provides functionality to:
//! - Plan which days a run has to report since the last checkpoint
//! - Bound the duration each submission claims to the backend's granularity
//! - Collect call, message and usage metrics through a `MetricsSource`
//! - Submit one batch per day to a `MetricsSink` and advance the checkpoint
//!   only once every batch was accepted
//!
//! It is meant to be invoked repeatedly (from cron or a timer) and tolerates
//! irregular intervals: a run after midnight first flushes yesterday, a run
//! after a long outage never looks back further than yesterday.
//!
//! # Examples
//!
//! ```no_run
//! use callstat::{
//!     config::AgentConfig,
//!     driver::Reporter,
//!     provider::DataLoader,
//!     sinks::JsonLinesSink,
//!     store::FileCheckpointStore,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> callstat::Result<()> {
//!     let config = AgentConfig::load("callstat.json").await?;
//!     let source = Arc::new(DataLoader::new()?);
//!     let reporter = Reporter::from_config(
//!         &config,
//!         Arc::new(JsonLinesSink::stdout()),
//!         Arc::new(FileCheckpointStore::from_env()?),
//!     )?;
//!
//!     reporter.run_all(&config.build_components(source)).await?;
//!     Ok(())
//! }
//! ```

pub mod collectors;
pub mod config;
pub mod driver;
pub mod duration;
pub mod sinks;
pub mod window;

// Core modules, re-exported so callers only need this crate
pub use callstat_core::{checkpoint, clock, error, metric, sink, source, timezone, types};

/// Snapshot-backed metrics source
pub use callstat_provider_fixture as provider;
/// Checkpoint store implementations
pub use callstat_store as store;

// Re-export commonly used types
pub use error::{CallstatError, Result};
pub use types::{DailyDate, ISOTimestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

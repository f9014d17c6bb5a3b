//! Checkpoint store trait
//!
//! A checkpoint is the instant up to which a component was last reported.
//! Stores keep one timestamp per key and nothing else.

use crate::error::Result;
use crate::types::ISOTimestamp;
use async_trait::async_trait;

/// Durable key to timestamp storage
///
/// A store is assumed to have a single writer per key: one run of a
/// component at a time. Implementations do not coordinate concurrent runs.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Last persisted timestamp for `key`, or `None` if never written
    async fn get(&self, key: &str) -> Result<Option<ISOTimestamp>>;

    /// Persist `at` for `key`, replacing any previous value
    async fn put(&self, key: &str, at: ISOTimestamp) -> Result<()>;
}

/// Checkpoint key for a component
///
/// # Examples
/// ```
/// use callstat_core::checkpoint::checkpoint_key;
///
/// assert_eq!(
///     checkpoint_key("Today Usage"),
///     "Today Usage_previously_processed_at"
/// );
/// ```
pub fn checkpoint_key(component: &str) -> String {
    format!("{component}_previously_processed_at")
}

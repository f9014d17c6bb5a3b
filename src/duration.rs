//! Duration calculation
//!
//! The backend accounts every component submission against a duration: the
//! number of seconds the batch stands for. It rejects intervals longer than
//! its accounting granularity, so durations are clamped to an upper bound.

use crate::types::ISOTimestamp;
use serde::{Deserialize, Serialize};

/// Longest interval the backend accepts for one submission, in seconds
pub const MAX_DURATION_SECS: u64 = 3600;

/// Duration assumed when there is no cursor to measure from
///
/// Equal to the maximum so a first run claims one full accounting interval,
/// the same value a cursor at the start of the day yields after 01:00.
pub const DEFAULT_FIRST_RUN_DURATION_SECS: u64 = 3600;

/// Bounds applied when turning elapsed time into a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationPolicy {
    /// Upper bound of every duration
    pub max_secs: u64,
    /// Duration reported when no cursor is known
    pub first_run_secs: u64,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            max_secs: MAX_DURATION_SECS,
            first_run_secs: DEFAULT_FIRST_RUN_DURATION_SECS,
        }
    }
}

impl DurationPolicy {
    /// Seconds from `since` to `now`, clamped to `[0, max_secs]`
    ///
    /// # Examples
    /// ```
    /// use callstat::duration::DurationPolicy;
    /// use callstat::types::ISOTimestamp;
    ///
    /// let policy = DurationPolicy::default();
    /// let since = ISOTimestamp::from_unix_seconds(1_704_153_000).unwrap();
    /// let now = ISOTimestamp::from_unix_seconds(1_704_153_600).unwrap();
    ///
    /// assert_eq!(policy.duration(Some(since), now), 600);
    /// assert_eq!(policy.duration(Some(now), since), 0);
    /// assert_eq!(policy.duration(None, now), 3600);
    /// ```
    pub fn duration(&self, since: Option<ISOTimestamp>, now: ISOTimestamp) -> u64 {
        match since {
            None => self.first_run_secs.min(self.max_secs),
            Some(since) => {
                let elapsed = now.seconds_since(&since).max(0) as u64;
                elapsed.min(self.max_secs)
            }
        }
    }
}

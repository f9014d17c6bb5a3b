//! Wall-clock access for the driver
//!
//! The driver reads "now" once per submitted date and pauses between
//! submissions. Both go through [`Clock`] so runs can be replayed at fixed
//! instants.

use crate::types::ISOTimestamp;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use std::time::Duration;

#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> ISOTimestamp;

    /// Pause the run for `duration`
    async fn sleep(&self, duration: Duration);
}

/// The system clock backed by tokio timers
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> ISOTimestamp {
        ISOTimestamp::new(Utc::now())
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A clock that only moves when told to
///
/// `sleep` returns immediately and advances the clock by the requested
/// duration, so a replayed run observes the same gaps a real one would.
///
/// # Examples
/// ```
/// use callstat_core::clock::{Clock, ManualClock};
/// use callstat_core::types::ISOTimestamp;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let clock = ManualClock::new(ISOTimestamp::from_unix_seconds(0).unwrap());
/// clock.sleep(Duration::from_secs(30)).await;
/// assert_eq!(clock.now().unix_seconds(), 30);
/// assert_eq!(clock.slept(), vec![Duration::from_secs(30)]);
/// # });
/// ```
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    now: ISOTimestamp,
    slept: Vec<Duration>,
}

impl ManualClock {
    pub fn new(start: ISOTimestamp) -> Self {
        Self {
            state: Mutex::new(ManualState {
                now: start,
                slept: Vec::new(),
            }),
        }
    }

    /// Move the clock forward without recording a sleep
    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        state.now = shift(state.now, by);
    }

    /// Jump to an absolute instant
    pub fn set(&self, to: ISOTimestamp) {
        self.lock().now = to;
    }

    /// Every sleep requested so far, in order
    pub fn slept(&self) -> Vec<Duration> {
        self.lock().slept.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        // A panic while holding the lock leaves plain data behind
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> ISOTimestamp {
        self.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.lock();
        state.now = shift(state.now, duration);
        state.slept.push(duration);
    }
}

fn shift(ts: ISOTimestamp, by: Duration) -> ISOTimestamp {
    let delta = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
    ISOTimestamp::new(ts.inner().checked_add_signed(delta).unwrap_or(*ts.inner()))
}

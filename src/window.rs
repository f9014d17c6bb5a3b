//! Window planning
//!
//! Decides which calendar days a run has to report and from which instant
//! the first day's duration is measured. The backlog never reaches further
//! back than yesterday: a checkpoint older than that is clamped to the start
//! of yesterday, so a long outage costs at most one extra submission.
//!
//! # Examples
//!
//! ```
//! use callstat::window::WindowPlanner;
//! use callstat::types::ISOTimestamp;
//! use callstat::timezone::TimezoneConfig;
//! use chrono::{TimeZone, Utc};
//!
//! let planner = WindowPlanner::new(TimezoneConfig::default());
//! let now = ISOTimestamp::new(Utc.with_ymd_and_hms(2024, 1, 2, 0, 5, 0).unwrap());
//! let checkpoint = ISOTimestamp::new(Utc.with_ymd_and_hms(2024, 1, 1, 23, 50, 0).unwrap());
//!
//! let window = planner.plan(now, Some(checkpoint));
//! let dates: Vec<String> = window.dates().iter().map(|d| d.to_string()).collect();
//! assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
//! assert_eq!(window.initial_since(), checkpoint);
//! ```

use crate::timezone::TimezoneConfig;
use crate::types::{DailyDate, ISOTimestamp};
use tracing::debug;

/// Dates to visit in one run, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingWindow {
    dates: Vec<DailyDate>,
    today: DailyDate,
    initial_since: ISOTimestamp,
    today_start: ISOTimestamp,
    first_run: bool,
}

impl ProcessingWindow {
    /// Dates in processing order; the last one is always today
    pub fn dates(&self) -> &[DailyDate] {
        &self.dates
    }

    /// Lower bound of the first date's duration
    pub fn initial_since(&self) -> ISOTimestamp {
        self.initial_since
    }

    /// Cursor the first date's duration is measured from
    ///
    /// `None` on a first run: there is no previous report to measure from,
    /// so the duration policy's first-run default applies.
    pub fn initial_cursor(&self) -> Option<ISOTimestamp> {
        (!self.first_run).then_some(self.initial_since)
    }

    /// Whether the window was planned without a checkpoint
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    /// First instant of today in the planner's timezone
    pub fn today_start(&self) -> ISOTimestamp {
        self.today_start
    }

    /// Today in the planner's timezone, also the last of [`Self::dates`]
    pub fn today(&self) -> DailyDate {
        self.today
    }

    /// Whether `date` is a day before today that still needs flushing
    pub fn is_backlog(&self, date: &DailyDate) -> bool {
        *date != self.today()
    }

    pub fn has_backlog(&self) -> bool {
        self.dates.len() > 1
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false: a window holds at least today
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Plans processing windows in a fixed timezone
#[derive(Debug, Clone, Default)]
pub struct WindowPlanner {
    tz: TimezoneConfig,
}

impl WindowPlanner {
    pub fn new(tz: TimezoneConfig) -> Self {
        Self { tz }
    }

    /// Plan the dates to report at `now` given the last checkpoint
    ///
    /// Without a checkpoint only today is reported, measured from the start
    /// of today. With one, the cursor starts at the checkpoint clamped to
    /// the start of yesterday, and the cursor's date is reported first when
    /// it is not today.
    pub fn plan(&self, now: ISOTimestamp, checkpoint: Option<ISOTimestamp>) -> ProcessingWindow {
        let today = self.tz.date_of(&now);
        let today_start = self.tz.start_of_day(&today);

        let since = match checkpoint {
            None => {
                debug!("No previous checkpoint, first run for {}", today);
                today_start
            }
            Some(at) => {
                debug!("Previously processed at: {}", at);
                let yesterday_start = self.tz.start_of_day(&today.previous());
                at.max(yesterday_start)
            }
        };

        let since_date = self.tz.date_of(&since);
        let mut dates = Vec::with_capacity(2);
        // A checkpoint ahead of `now` (clock skew) lands on today or later;
        // only a strictly earlier day counts as backlog.
        if since_date < today {
            dates.push(since_date);
        }
        dates.push(today);

        ProcessingWindow {
            dates,
            today,
            initial_since: since,
            today_start,
            first_run: checkpoint.is_none(),
        }
    }
}

//! Timezone utilities for day boundaries
//!
//! The reporting window is made of calendar days, so "today" and "start of
//! today" depend on the timezone the agent is configured for. The provider
//! and backend both account in UTC, which is therefore the default.

use crate::error::{CallstatError, Result};
use crate::types::{DailyDate, ISOTimestamp};
use chrono::{Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Configuration for timezone handling
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone to use for date operations
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            tz: Tz::UTC,
            is_utc: true,
        }
    }
}

impl TimezoneConfig {
    /// Create a timezone configuration from a configured name
    ///
    /// `None` selects UTC, `"local"` detects the system timezone, anything
    /// else must be an IANA name.
    pub fn from_name(timezone_str: Option<&str>) -> Result<Self> {
        let tz = match timezone_str {
            None => Tz::UTC,
            Some(s) if s.eq_ignore_ascii_case("local") => get_local_timezone(),
            Some(s) => Tz::from_str(s).map_err(|_| {
                CallstatError::InvalidTimezone(format!(
                    "'{s}'. Use format like 'America/New_York', 'Asia/Tokyo', 'UTC' or 'local'"
                ))
            })?,
        };

        Ok(Self {
            tz,
            is_utc: tz == Tz::UTC,
        })
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Calendar date of `ts` in this timezone
    pub fn date_of(&self, ts: &ISOTimestamp) -> DailyDate {
        ts.to_daily_date_with_tz(&self.tz)
    }

    /// First instant of `date` in this timezone
    ///
    /// When a DST transition skips local midnight, the day starts at the
    /// first local minute after the gap.
    pub fn start_of_day(&self, date: &DailyDate) -> ISOTimestamp {
        let midnight = date.inner().and_time(NaiveTime::MIN);
        let first_valid = (0..MINUTES_PER_DAY).find_map(|m| {
            self.tz
                .from_local_datetime(&(midnight + Duration::minutes(m)))
                .earliest()
        });

        match first_valid {
            Some(dt) => ISOTimestamp::new(dt.with_timezone(&Utc)),
            // The whole calendar day was skipped (Pacific/Apia, 2011-12-30)
            None => ISOTimestamp::new(Utc.from_utc_datetime(&midnight)),
        }
    }
}

/// Detect the system's local timezone
///
/// This function attempts to detect the local timezone from the system.
/// If detection fails, it falls back to UTC.
pub fn get_local_timezone() -> Tz {
    if let Ok(tz_str) = std::env::var("TZ")
        && let Ok(tz) = Tz::from_str(&tz_str)
    {
        debug!("Using timezone from TZ environment variable: {}", tz_str);
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => match Tz::from_str(&tz_str) {
            Ok(tz) => {
                debug!("Using system timezone from iana-time-zone: {}", tz_str);
                tz
            }
            Err(_) => {
                debug!(
                    "Could not parse timezone from iana-time-zone: '{}', falling back to UTC",
                    tz_str
                );
                Tz::UTC
            }
        },
        Err(e) => {
            debug!(
                "Could not detect local timezone via iana-time-zone: {:?}, falling back to UTC",
                e
            );
            Tz::UTC
        }
    }
}

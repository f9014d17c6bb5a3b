//! Core domain types for callstat
//!
//! This module contains the fundamental time types used throughout the
//! callstat library: UTC instants for checkpoints and cursors, and calendar
//! dates for the reporting window.

use crate::error::{CallstatError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO timestamp wrapper for UTC timestamps
///
/// Provides a strongly-typed wrapper around chrono's `DateTime<Utc>` with
/// serialization support and convenient conversion methods.
///
/// # Examples
/// ```
/// use callstat_core::types::ISOTimestamp;
/// use chrono::{TimeZone, Utc};
///
/// let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
/// let timestamp = ISOTimestamp::new(dt);
///
/// assert_eq!(timestamp.to_string(), "2024-01-15T10:30:00+00:00");
/// assert_eq!(timestamp.unix_seconds(), 1_705_314_600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ISOTimestamp(DateTime<Utc>);

impl ISOTimestamp {
    /// Create a new ISOTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Create from whole seconds since the Unix epoch
    pub fn from_unix_seconds(secs: i64) -> Result<Self> {
        Utc.timestamp_opt(secs, 0)
            .single()
            .map(Self)
            .ok_or_else(|| CallstatError::InvalidDate(format!("timestamp out of range: {secs}")))
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Whole seconds since the Unix epoch
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Signed number of whole seconds elapsed from `earlier` to `self`
    pub fn seconds_since(&self, earlier: &ISOTimestamp) -> i64 {
        (self.0 - earlier.0).num_seconds()
    }

    /// Convert to DailyDate using specified timezone
    pub fn to_daily_date_with_tz(&self, tz: &Tz) -> DailyDate {
        let local_dt = self.0.with_timezone(tz);
        DailyDate::new(local_dt.date_naive())
    }
}

impl AsRef<DateTime<Utc>> for ISOTimestamp {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for ISOTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for ISOTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Calendar date of a reporting window
///
/// Represents a calendar date without time information. Every metric batch
/// is reported for exactly one `DailyDate`.
///
/// # Examples
/// ```
/// use callstat_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let daily = DailyDate::new(date);
///
/// assert_eq!(daily.format("%Y-%m-%d"), "2024-01-15");
/// assert_eq!(daily.previous().format("%Y-%m-%d"), "2024-01-14");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYY-MM-DD` string
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| CallstatError::InvalidDate(format!("'{s}'. Use YYYY-MM-DD format")))
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// The calendar day before this one
    pub fn previous(&self) -> Self {
        // NaiveDate::MIN has no predecessor; saturate there
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

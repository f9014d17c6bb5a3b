//! Metric records submitted to the backend
//!
//! A metric record is a `(name, unit, value)` triple. Records coming out of
//! the provider are frequently incomplete (usage categories without a price
//! unit, for example); [`MetricRecord::build`] is the single place where
//! such records are filtered out so they never reach a submission.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Observed value of a metric
///
/// Counts stay integral and amounts (usage, price) stay floating point. The
/// caller picks the variant per field; nothing here converts between them.
///
/// # Examples
/// ```
/// use callstat_core::metric::MetricValue;
///
/// let count: MetricValue = serde_json::from_str("12").unwrap();
/// assert_eq!(count, MetricValue::Count(12));
///
/// let price: MetricValue = serde_json::from_str("-0.0075").unwrap();
/// assert_eq!(price, MetricValue::Amount(-0.0075));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Integral count of events
    Count(u64),
    /// Fractional quantity such as minutes or a price
    Amount(f64),
}

impl MetricValue {
    /// Value as f64, for backends that only accept floats
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Count(n) => *n as f64,
            Self::Amount(x) => *x,
        }
    }
}

impl From<u64> for MetricValue {
    fn from(n: u64) -> Self {
        Self::Count(n)
    }
}

impl From<f64> for MetricValue {
    fn from(x: f64) -> Self {
        Self::Amount(x)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Amount(x) => write!(f, "{x}"),
        }
    }
}

/// A single named observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Display name, e.g. `"Queued"` or `"Calls Price"`
    pub name: String,
    /// Unit label, e.g. `"calls"`, `"minutes"`, `"usd"`
    pub unit: String,
    /// Observed value
    pub value: MetricValue,
}

impl MetricRecord {
    /// Build a record, rejecting incomplete observations
    ///
    /// Returns `None` when the name or unit is blank or the value is absent.
    /// Callers drop `None` results instead of submitting them.
    ///
    /// # Examples
    /// ```
    /// use callstat_core::metric::{MetricRecord, MetricValue};
    ///
    /// assert!(MetricRecord::build("Queued", "", Some(MetricValue::Count(5))).is_none());
    /// assert!(MetricRecord::build("Queued", "calls", None).is_none());
    ///
    /// let record = MetricRecord::build("Queued", "calls", Some(MetricValue::Count(5))).unwrap();
    /// assert_eq!(record.value, MetricValue::Count(5));
    /// ```
    pub fn build(name: &str, unit: &str, value: Option<MetricValue>) -> Option<Self> {
        let Some(value) = value else {
            debug!("Dropping metric {:?}: no value", name);
            return None;
        };
        if name.trim().is_empty() || unit.trim().is_empty() {
            debug!("Dropping metric {:?}: blank name or unit", name);
            return None;
        }

        debug!("{} {}: {}", name, unit, value);
        Some(Self {
            name: name.to_string(),
            unit: unit.to_string(),
            value,
        })
    }
}

/// Upper-case the first character and lower-case the rest
///
/// # Examples
/// ```
/// use callstat_core::metric::capitalize;
///
/// assert_eq!(capitalize("in-progress"), "In-progress");
/// assert_eq!(capitalize("SMS"), "Sms");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

//! Metrics source trait
//!
//! This module defines the `MetricsSource` trait that provider crates
//! implement. The driver only ever asks three questions of a telephony
//! account for a given date; how the provider answers them (paging, retries,
//! authentication) stays behind the trait.

use crate::error::Result;
use crate::metric::MetricValue;
use crate::types::DailyDate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Call statuses reported by the provider, in reporting order
pub const CALL_STATUSES: &[&str] = &[
    "queued",
    "ringing",
    "in-progress",
    "canceled",
    "completed",
    "failed",
    "busy",
    "no-answer",
];

/// Message statuses reported by the provider, in reporting order
pub const MESSAGE_STATUSES: &[&str] = &["queued", "sending", "sent", "failed", "received"];

/// One usage category of the account for a date
///
/// Every submetric carries its own unit; any of them may be missing for
/// categories the provider does not meter that way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Usage category, e.g. `"calls-inbound"`
    pub category: String,
    #[serde(default)]
    pub count: Option<MetricValue>,
    #[serde(default)]
    pub count_unit: Option<String>,
    #[serde(default)]
    pub usage: Option<MetricValue>,
    #[serde(default)]
    pub usage_unit: Option<String>,
    #[serde(default)]
    pub price: Option<MetricValue>,
    #[serde(default)]
    pub price_unit: Option<String>,
}

impl UsageRecord {
    /// Submetrics as `(submetric name, unit, value)` in reporting order
    pub fn submetrics(&self) -> [(&'static str, Option<&str>, Option<MetricValue>); 3] {
        [
            ("count", self.count_unit.as_deref(), self.count),
            ("usage", self.usage_unit.as_deref(), self.usage),
            ("price", self.price_unit.as_deref(), self.price),
        ]
    }
}

/// Read access to a telephony account's usage
///
/// Implementations answer for a whole calendar day. Errors propagate to the
/// driver, which abandons the run without advancing the checkpoint.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Number of calls started on `date` that are currently in `status`
    async fn count_calls(&self, date: DailyDate, status: &str) -> Result<u64>;

    /// Status of every message sent on `date`, one entry per message
    async fn message_statuses(&self, date: DailyDate) -> Result<Vec<String>>;

    /// Usage records of the account starting at `date`
    async fn usage_records(&self, date: DailyDate) -> Result<Vec<UsageRecord>>;
}

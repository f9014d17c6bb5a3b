//! Metric collectors and components
//!
//! A collector turns one date into metric records by querying a
//! [`MetricsSource`]. A [`Component`] is a named, ordered list of collectors
//! whose records are submitted together and share one checkpoint.
//!
//! Three stock components mirror the account views the agent reports:
//! calls by status, messages by status, and usage per category.

use crate::error::Result;
use crate::metric::{MetricRecord, MetricValue, capitalize};
use crate::source::{CALL_STATUSES, MESSAGE_STATUSES, MetricsSource};
use crate::types::DailyDate;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

/// Produces the records of one date
pub type Collector =
    Box<dyn Fn(DailyDate) -> BoxFuture<'static, Result<Vec<MetricRecord>>> + Send + Sync>;

/// Wrap an async function as a [`Collector`]
///
/// # Examples
/// ```
/// use callstat::collectors::{Component, collector};
/// use callstat::metric::{MetricRecord, MetricValue};
///
/// let component = Component::new("Heartbeat").with_collector(collector(|_date| async {
///     Ok(MetricRecord::build("Alive", "runs", Some(MetricValue::Count(1)))
///         .into_iter()
///         .collect())
/// }));
/// assert_eq!(component.collectors().len(), 1);
/// ```
pub fn collector<F, Fut>(f: F) -> Collector
where
    F: Fn(DailyDate) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<MetricRecord>>> + Send + 'static,
{
    Box::new(move |date| f(date).boxed())
}

/// A named group of metrics submitted together
pub struct Component {
    name: String,
    collectors: Vec<Collector>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collectors: Vec::new(),
        }
    }

    /// Register a collector; collectors run in registration order
    pub fn with_collector(mut self, collector: Collector) -> Self {
        self.collectors.push(collector);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collectors(&self) -> &[Collector] {
        &self.collectors
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("collectors", &self.collectors.len())
            .finish()
    }
}

/// The components shipped with callstat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockComponent {
    /// Call counts per call status
    CallsByStatus,
    /// Message counts per message status
    SmsByStatus,
    /// Count, usage and price per usage category
    Usage,
}

impl StockComponent {
    /// All stock components in reporting order
    pub const ALL: [StockComponent; 3] = [Self::CallsByStatus, Self::SmsByStatus, Self::Usage];

    /// Component name as shown by the backend; also keys the checkpoint
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CallsByStatus => "Today Calls by Status",
            Self::SmsByStatus => "Today SMSs by Status",
            Self::Usage => "Today Usage",
        }
    }

    /// Build the component against `source`
    pub fn build(&self, source: Arc<dyn MetricsSource>) -> Component {
        let component = Component::new(self.display_name());
        match self {
            Self::CallsByStatus => component.with_collector(calls_by_status(source)),
            Self::SmsByStatus => component.with_collector(messages_by_status(source)),
            Self::Usage => component.with_collector(usage_records(source)),
        }
    }
}

impl fmt::Display for StockComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CallsByStatus => write!(f, "calls-by-status"),
            Self::SmsByStatus => write!(f, "sms-by-status"),
            Self::Usage => write!(f, "usage"),
        }
    }
}

impl FromStr for StockComponent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calls-by-status" => Ok(Self::CallsByStatus),
            "sms-by-status" => Ok(Self::SmsByStatus),
            "usage" => Ok(Self::Usage),
            _ => Err(format!("Unknown component: {s}")),
        }
    }
}

/// One `calls` record per call status, in [`CALL_STATUSES`] order
pub fn calls_by_status(source: Arc<dyn MetricsSource>) -> Collector {
    collector(move |date| {
        let source = Arc::clone(&source);
        async move {
            let mut records = Vec::with_capacity(CALL_STATUSES.len());
            for status in CALL_STATUSES {
                let count = source.count_calls(date, status).await?;
                records.extend(MetricRecord::build(
                    &capitalize(status),
                    "calls",
                    Some(MetricValue::Count(count)),
                ));
            }
            Ok(records)
        }
    })
}

/// One `messages` record per message status
///
/// Every known status is reported, zero when no message had it. Statuses
/// outside [`MESSAGE_STATUSES`] follow in the order they were first seen.
pub fn messages_by_status(source: Arc<dyn MetricsSource>) -> Collector {
    collector(move |date| {
        let source = Arc::clone(&source);
        async move {
            let statuses = source.message_statuses(date).await?;
            Ok(count_statuses(&statuses)
                .into_iter()
                .filter_map(|(status, count)| {
                    MetricRecord::build(
                        &capitalize(&status),
                        "messages",
                        Some(MetricValue::Count(count)),
                    )
                })
                .collect())
        }
    })
}

/// `"<Category> Count|Usage|Price"` records for every usage record
///
/// Submetrics without a unit or a value are dropped.
pub fn usage_records(source: Arc<dyn MetricsSource>) -> Collector {
    collector(move |date| {
        let source = Arc::clone(&source);
        async move {
            let usage = source.usage_records(date).await?;
            let mut records = Vec::with_capacity(usage.len() * 3);
            for record in &usage {
                let category = capitalize(&record.category);
                for (submetric, unit, value) in record.submetrics() {
                    let name = format!("{category} {}", capitalize(submetric));
                    records.extend(MetricRecord::build(&name, unit.unwrap_or(""), value));
                }
            }
            Ok(records)
        }
    })
}

fn count_statuses(statuses: &[String]) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = MESSAGE_STATUSES
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();

    for status in statuses {
        match counts.iter().position(|(known, _)| known == status) {
            Some(i) => counts[i].1 += 1,
            None => counts.push((status.clone(), 1)),
        }
    }
    counts
}

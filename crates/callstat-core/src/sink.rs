//! Metrics sink trait and the batch it accepts
//!
//! The monitoring backend groups metrics into named components, each
//! submitted together with one duration value. A `ComponentBatch` is one
//! such submission for one reporting date; batches for different dates are
//! never merged.

use crate::error::Result;
use crate::metric::MetricRecord;
use crate::types::DailyDate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One component submission for one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBatch {
    /// Component name, e.g. `"Today Calls by Status"`
    pub component: String,
    /// Date the metrics describe
    pub date: DailyDate,
    /// Seconds of wall-clock time the batch stands for
    pub duration_secs: u64,
    /// Metrics in collection order
    pub metrics: Vec<MetricRecord>,
}

impl ComponentBatch {
    /// Open an empty batch; the duration is attached right before submission
    pub fn new(component: impl Into<String>, date: DailyDate) -> Self {
        Self {
            component: component.into(),
            date,
            duration_secs: 0,
            metrics: Vec::new(),
        }
    }

    /// Append records produced by one collector
    pub fn extend(&mut self, records: impl IntoIterator<Item = MetricRecord>) {
        self.metrics.extend(records);
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Write access to the monitoring backend
///
/// `submit` commits the whole batch or fails; a failed batch is treated as
/// not delivered. Backends typically enforce a minimum interval between
/// commits, which the driver honours by spacing its submissions.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn submit(&self, batch: &ComponentBatch) -> Result<()>;
}

//! Aggregation driver
//!
//! The [`Reporter`] runs components: it reads a component's checkpoint,
//! plans the window, collects and submits one batch per date, and persists
//! the new checkpoint once every date of the window was accepted.
//!
//! Delivery is at-least-once. Any collector, sink or store failure aborts
//! the run before the checkpoint moves, so the next invocation reports the
//! same window again.
//!
//! # Examples
//!
//! ```no_run
//! use callstat::{
//!     collectors::StockComponent,
//!     driver::Reporter,
//!     provider::DataLoader,
//!     sinks::JsonLinesSink,
//!     store::FileCheckpointStore,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> callstat::Result<()> {
//! let source = Arc::new(DataLoader::new()?);
//! let reporter = Reporter::new(
//!     Arc::new(JsonLinesSink::stdout()),
//!     Arc::new(FileCheckpointStore::from_env()?),
//! );
//!
//! let components: Vec<_> = StockComponent::ALL
//!     .iter()
//!     .map(|c| c.build(source.clone()))
//!     .collect();
//! let summaries = reporter.run_all(&components).await?;
//! # Ok(())
//! # }
//! ```

use crate::checkpoint::{CheckpointStore, checkpoint_key};
use crate::clock::{Clock, SystemClock};
use crate::collectors::Component;
use crate::config::AgentConfig;
use crate::duration::DurationPolicy;
use crate::error::Result;
use crate::sink::{ComponentBatch, MetricsSink};
use crate::timezone::TimezoneConfig;
use crate::types::{DailyDate, ISOTimestamp};
use crate::window::{ProcessingWindow, WindowPlanner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Pause between a backlog submission and the next one
pub const DEFAULT_SUBMISSION_SPACING: Duration = Duration::from_secs(30);

/// What to do when the checkpoint store cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckpointReadPolicy {
    /// Abort the run with the store's error
    #[default]
    Fail,
    /// Log a warning and plan as if no checkpoint existed
    AssumeFirstRun,
}

/// Outcome of one submitted date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateReport {
    pub date: DailyDate,
    /// Instant the batch was stamped right before submission
    pub processed_at: ISOTimestamp,
    pub duration_secs: u64,
    /// Number of metrics in the submitted batch
    pub metrics: usize,
}

/// Outcome of one component run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub component: String,
    /// Submitted dates in order
    pub dates: Vec<DateReport>,
    /// Checkpoint persisted at the end of the run
    pub checkpoint: ISOTimestamp,
}

/// Runs components against a sink and a checkpoint store
pub struct Reporter {
    sink: Arc<dyn MetricsSink>,
    store: Arc<dyn CheckpointStore>,
    clock: Arc<dyn Clock>,
    planner: WindowPlanner,
    durations: DurationPolicy,
    submission_spacing: Duration,
    read_policy: CheckpointReadPolicy,
}

impl Reporter {
    /// Create a reporter with UTC day boundaries and default limits
    pub fn new(sink: Arc<dyn MetricsSink>, store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            sink,
            store,
            clock: Arc::new(SystemClock),
            planner: WindowPlanner::default(),
            durations: DurationPolicy::default(),
            submission_spacing: DEFAULT_SUBMISSION_SPACING,
            read_policy: CheckpointReadPolicy::default(),
        }
    }

    /// Create a reporter configured from an [`AgentConfig`]
    pub fn from_config(
        config: &AgentConfig,
        sink: Arc<dyn MetricsSink>,
        store: Arc<dyn CheckpointStore>,
    ) -> Result<Self> {
        config.validate()?;
        let tz = config.timezone_config()?;
        info!("Using timezone: {}", tz.display_name());

        Ok(Self::new(sink, store)
            .with_timezone(tz)
            .with_duration_policy(config.duration_policy())
            .with_submission_spacing(config.submission_spacing())
            .with_checkpoint_read_policy(config.checkpoint_read_policy))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timezone(mut self, tz: TimezoneConfig) -> Self {
        self.planner = WindowPlanner::new(tz);
        self
    }

    pub fn with_duration_policy(mut self, durations: DurationPolicy) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_submission_spacing(mut self, spacing: Duration) -> Self {
        self.submission_spacing = spacing;
        self
    }

    pub fn with_checkpoint_read_policy(mut self, policy: CheckpointReadPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    /// Run components one after another
    ///
    /// Stops at the first failing component; components before it keep
    /// their advanced checkpoints.
    pub async fn run_all(&self, components: &[Component]) -> Result<Vec<RunSummary>> {
        let mut summaries = Vec::with_capacity(components.len());
        for component in components {
            summaries.push(self.run_component(component).await?);
        }
        Ok(summaries)
    }

    /// Report one component and advance its checkpoint
    pub async fn run_component(&self, component: &Component) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", component = component.name(), %run_id);

        async move {
            info!("Processing: {}", component.name());
            let key = checkpoint_key(component.name());
            let previous = self.read_checkpoint(&key).await?;

            let window = self.planner.plan(self.clock.now(), previous);
            let summary = self.run_window(component, &window).await?;

            self.store.put(&key, summary.checkpoint).await?;
            info!(
                "{} processed at {}",
                component.name(),
                summary.checkpoint
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Submit one batch per date of `window`, without touching the store
    ///
    /// The returned summary carries the checkpoint the caller should
    /// persist: the stamp of the last submitted batch.
    pub async fn run_window(
        &self,
        component: &Component,
        window: &ProcessingWindow,
    ) -> Result<RunSummary> {
        let mut since = window.initial_cursor();
        let mut reports = Vec::with_capacity(window.len());
        let mut checkpoint = window.initial_since();

        for date in window.dates() {
            let mut batch = ComponentBatch::new(component.name(), *date);
            for collect in component.collectors() {
                batch.extend(collect(*date).await?);
            }

            let processed_at = self.clock.now();
            batch.duration_secs = self.durations.duration(since, processed_at);
            debug!(
                "Duration for {} is {}s ({} metrics)",
                date,
                batch.duration_secs,
                batch.len()
            );

            self.sink.submit(&batch).await?;
            info!(
                "Submitted {} metrics for {} with duration {}s",
                batch.len(),
                date,
                batch.duration_secs
            );

            reports.push(DateReport {
                date: *date,
                processed_at,
                duration_secs: batch.duration_secs,
                metrics: batch.len(),
            });
            checkpoint = processed_at;

            if window.is_backlog(date) {
                // The backend records at most one interval per day durably,
                // so today is measured from its own midnight
                since = Some(window.today_start());
                if !self.submission_spacing.is_zero() {
                    debug!(
                        "Waiting {}s before the next submission",
                        self.submission_spacing.as_secs()
                    );
                    self.clock.sleep(self.submission_spacing).await;
                }
            }
        }

        Ok(RunSummary {
            component: component.name().to_string(),
            dates: reports,
            checkpoint,
        })
    }

    async fn read_checkpoint(&self, key: &str) -> Result<Option<ISOTimestamp>> {
        match self.store.get(key).await {
            Ok(previous) => Ok(previous),
            Err(e) => match self.read_policy {
                CheckpointReadPolicy::Fail => Err(e),
                CheckpointReadPolicy::AssumeFirstRun => {
                    warn!("Cannot read checkpoint {}: {}, treating as first run", key, e);
                    Ok(None)
                }
            },
        }
    }
}

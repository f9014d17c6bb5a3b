//! Agent configuration
//!
//! Configuration is a JSON file whose fields all have defaults, so an empty
//! object is a valid configuration:
//!
//! ```json
//! {
//!   "timezone": "UTC",
//!   "max_duration_secs": 3600,
//!   "first_run_duration_secs": 3600,
//!   "submission_spacing_secs": 30,
//!   "checkpoint_read_policy": "fail",
//!   "components": ["calls-by-status", "sms-by-status", "usage"]
//! }
//! ```
//!
//! `CALLSTAT_TIMEZONE` and `CALLSTAT_SUBMISSION_SPACING_SECS` override the
//! file when set.

use crate::collectors::{Component, StockComponent};
use crate::driver::{CheckpointReadPolicy, DEFAULT_SUBMISSION_SPACING};
use crate::duration::{DEFAULT_FIRST_RUN_DURATION_SECS, DurationPolicy, MAX_DURATION_SECS};
use crate::error::{CallstatError, Result};
use crate::source::MetricsSource;
use crate::timezone::TimezoneConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const TIMEZONE_ENV: &str = "CALLSTAT_TIMEZONE";
pub const SUBMISSION_SPACING_ENV: &str = "CALLSTAT_SUBMISSION_SPACING_SECS";

/// Settings for one agent invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// IANA timezone for day boundaries, `"local"` for the system zone
    pub timezone: String,
    /// Upper bound of a submission's duration
    pub max_duration_secs: u64,
    /// Duration claimed by a component's very first submission
    pub first_run_duration_secs: u64,
    /// Pause after a backlog submission
    pub submission_spacing_secs: u64,
    pub checkpoint_read_policy: CheckpointReadPolicy,
    /// Components to report, in order
    pub components: Vec<StockComponent>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            max_duration_secs: MAX_DURATION_SECS,
            first_run_duration_secs: DEFAULT_FIRST_RUN_DURATION_SECS,
            submission_spacing_secs: DEFAULT_SUBMISSION_SPACING.as_secs(),
            checkpoint_read_policy: CheckpointReadPolicy::default(),
            components: StockComponent::ALL.to_vec(),
        }
    }
}

impl AgentConfig {
    /// Parse a JSON configuration document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| CallstatError::Config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, then apply environment overrides
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            CallstatError::Config(format!("cannot read {}: {e}", path.display()))
        })?;

        let mut config: Self =
            serde_json::from_str(&content).map_err(|e| CallstatError::Parse {
                file: path.to_path_buf(),
                error: e.to_string(),
            })?;
        debug!("Loaded configuration from {}", path.display());

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CALLSTAT_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(tz) = std::env::var(TIMEZONE_ENV) {
            debug!("Timezone overridden by {}: {}", TIMEZONE_ENV, tz);
            self.timezone = tz;
        }

        if let Ok(spacing) = std::env::var(SUBMISSION_SPACING_ENV) {
            self.submission_spacing_secs = spacing.trim().parse().map_err(|_| {
                CallstatError::Config(format!(
                    "{SUBMISSION_SPACING_ENV} must be a number of seconds, got '{spacing}'"
                ))
            })?;
        }
        Ok(())
    }

    /// Reject settings the backend or the planner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_duration_secs == 0 {
            return Err(CallstatError::Config(
                "max_duration_secs must be greater than zero".into(),
            ));
        }
        if self.first_run_duration_secs > self.max_duration_secs {
            return Err(CallstatError::Config(format!(
                "first_run_duration_secs ({}) exceeds max_duration_secs ({})",
                self.first_run_duration_secs, self.max_duration_secs
            )));
        }
        if self.components.is_empty() {
            return Err(CallstatError::Config("no components configured".into()));
        }
        for (i, component) in self.components.iter().enumerate() {
            if self.components[..i].contains(component) {
                return Err(CallstatError::Config(format!(
                    "component '{component}' listed twice"
                )));
            }
        }
        self.timezone_config()
            .map_err(|e| CallstatError::Config(e.to_string()))?;
        Ok(())
    }

    pub fn timezone_config(&self) -> Result<TimezoneConfig> {
        TimezoneConfig::from_name(Some(&self.timezone))
    }

    pub fn duration_policy(&self) -> DurationPolicy {
        DurationPolicy {
            max_secs: self.max_duration_secs,
            first_run_secs: self.first_run_duration_secs,
        }
    }

    pub fn submission_spacing(&self) -> Duration {
        Duration::from_secs(self.submission_spacing_secs)
    }

    /// Build the configured components against `source`
    pub fn build_components(&self, source: Arc<dyn MetricsSource>) -> Vec<Component> {
        self.components
            .iter()
            .map(|c| c.build(Arc::clone(&source)))
            .collect()
    }
}

//! Snapshot data loader
//!
//! Answers `MetricsSource` queries from per-day JSON snapshots stored in
//! `$CALLSTAT_FIXTURE_DIR` or `~/.local/share/callstat/fixtures/`. Each file
//! is named after the date it describes:
//!
//! ```json
//! // 2024-01-02.json
//! {
//!   "calls": { "completed": 41, "no-answer": 3 },
//!   "messages": ["sent", "sent", "failed"],
//!   "usage": [
//!     { "category": "calls", "count": 44, "count_unit": "calls",
//!       "usage": 97, "usage_unit": "minutes", "price": 1.23, "price_unit": "usd" }
//!   ]
//! }
//! ```
//!
//! A missing snapshot means the account had no activity that day.

use async_trait::async_trait;
use callstat_core::error::{CallstatError, Result};
use callstat_core::source::{MetricsSource, UsageRecord};
use callstat_core::types::DailyDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Environment variable selecting the snapshot directory
pub const FIXTURE_DIR_ENV: &str = "CALLSTAT_FIXTURE_DIR";

/// Account activity for one day
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DaySnapshot {
    /// Call counts keyed by status
    #[serde(default)]
    pub calls: HashMap<String, u64>,
    /// One status per message sent that day
    #[serde(default)]
    pub messages: Vec<String>,
    /// Usage records for the day
    #[serde(default)]
    pub usage: Vec<UsageRecord>,
}

/// Metrics source backed by a directory of day snapshots
pub struct DataLoader {
    snapshots_dir: PathBuf,
    cache: RwLock<HashMap<DailyDate, Arc<DaySnapshot>>>,
}

impl DataLoader {
    /// Locate the snapshot directory from the environment or the user data dir
    pub fn new() -> Result<Self> {
        let dir = if let Ok(dir) = std::env::var(FIXTURE_DIR_ENV) {
            PathBuf::from(dir)
        } else {
            dirs::data_dir()
                .ok_or_else(|| CallstatError::Config("Cannot determine data directory".into()))?
                .join("callstat")
                .join("fixtures")
        };

        if !dir.exists() {
            debug!("Snapshot directory not found: {}", dir.display());
        }

        Ok(Self::with_dir(dir))
    }

    /// Read snapshots from an explicit directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots_dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn snapshots_dir(&self) -> &Path {
        &self.snapshots_dir
    }

    /// Snapshot for `date`, read from disk on first use
    pub async fn snapshot(&self, date: DailyDate) -> Result<Arc<DaySnapshot>> {
        if let Some(snapshot) = self.cache.read().await.get(&date) {
            return Ok(Arc::clone(snapshot));
        }

        let snapshot = Arc::new(self.read_snapshot(date).await?);
        self.cache
            .write()
            .await
            .insert(date, Arc::clone(&snapshot));
        Ok(snapshot)
    }

    async fn read_snapshot(&self, date: DailyDate) -> Result<DaySnapshot> {
        let path = self.snapshots_dir.join(format!("{date}.json"));
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No snapshot for {}, assuming no activity", date);
                return Ok(DaySnapshot::default());
            }
            Err(e) => {
                return Err(CallstatError::Source(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        serde_json::from_str(&content).map_err(|e| CallstatError::Parse {
            file: path,
            error: e.to_string(),
        })
    }
}

#[async_trait]
impl MetricsSource for DataLoader {
    async fn count_calls(&self, date: DailyDate, status: &str) -> Result<u64> {
        let snapshot = self.snapshot(date).await?;
        Ok(snapshot.calls.get(status).copied().unwrap_or(0))
    }

    async fn message_statuses(&self, date: DailyDate) -> Result<Vec<String>> {
        Ok(self.snapshot(date).await?.messages.clone())
    }

    async fn usage_records(&self, date: DailyDate) -> Result<Vec<UsageRecord>> {
        Ok(self.snapshot(date).await?.usage.clone())
    }
}

//! JSON file checkpoint store
//!
//! Checkpoints live in one JSON object mapping key to Unix seconds:
//!
//! ```json
//! { "Today Calls by Status_previously_processed_at": 1704153900 }
//! ```
//!
//! Writes go to a sibling temp file that is renamed over the original, so a
//! crash mid-write leaves the previous checkpoints intact.

use async_trait::async_trait;
use callstat_core::checkpoint::CheckpointStore;
use callstat_core::error::{CallstatError, Result};
use callstat_core::types::ISOTimestamp;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Environment variable overriding the default checkpoint file location
pub const CHECKPOINT_FILE_ENV: &str = "CALLSTAT_CHECKPOINT_FILE";

type Checkpoints = BTreeMap<String, i64>;

/// Checkpoints persisted in a JSON file
#[derive(Debug)]
pub struct FileCheckpointStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileCheckpointStore {
    /// Use the checkpoint file at `path`; it is created on first `put`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Locate the checkpoint file from the environment or the user cache dir
    ///
    /// `CALLSTAT_CHECKPOINT_FILE` wins; otherwise
    /// `<cache dir>/callstat/checkpoints.json` is used.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var(CHECKPOINT_FILE_ENV) {
            return Ok(Self::new(path));
        }

        let path = dirs::cache_dir()
            .ok_or_else(|| CallstatError::Config("Cannot determine cache directory".into()))?
            .join("callstat")
            .join("checkpoints.json");
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Checkpoints> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Checkpoint file {} does not exist yet", self.path.display());
                return Ok(Checkpoints::new());
            }
            Err(e) => {
                return Err(CallstatError::Checkpoint(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(Checkpoints::new());
        }

        serde_json::from_str(&content).map_err(|e| CallstatError::Parse {
            file: self.path.clone(),
            error: e.to_string(),
        })
    }

    async fn save(&self, checkpoints: &Checkpoints) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(checkpoints)?;
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn get(&self, key: &str) -> Result<Option<ISOTimestamp>> {
        let checkpoints = self.load().await?;
        checkpoints
            .get(key)
            .map(|secs| ISOTimestamp::from_unix_seconds(*secs))
            .transpose()
    }

    async fn put(&self, key: &str, at: ISOTimestamp) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut checkpoints = self.load().await?;
        checkpoints.insert(key.to_string(), at.unix_seconds());
        self.save(&checkpoints).await?;
        debug!("Persisted checkpoint {} = {}", key, at);
        Ok(())
    }
}

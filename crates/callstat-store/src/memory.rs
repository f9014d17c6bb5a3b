//! In-memory checkpoint store

use async_trait::async_trait;
use callstat_core::checkpoint::CheckpointStore;
use callstat_core::error::Result;
use callstat_core::types::ISOTimestamp;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Checkpoints kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: RwLock<HashMap<String, ISOTimestamp>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing checkpoint
    pub fn with_entry(key: impl Into<String>, at: ISOTimestamp) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), at);
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn get(&self, key: &str) -> Result<Option<ISOTimestamp>> {
        Ok(self.entries.read().await.get(key).copied())
    }

    async fn put(&self, key: &str, at: ISOTimestamp) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), at);
        Ok(())
    }
}

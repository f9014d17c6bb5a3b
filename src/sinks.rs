//! Bundled metrics sinks
//!
//! Neither sink talks to a monitoring backend. [`JsonLinesSink`] writes each
//! accepted batch as one JSON line, for dry runs and for piping into a
//! shipper; [`MemorySink`] keeps batches in memory and can be told to start
//! rejecting them.

use crate::error::{CallstatError, Result};
use crate::sink::{ComponentBatch, MetricsSink};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

/// Writes one JSON object per submitted batch
pub struct JsonLinesSink {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl JsonLinesSink {
    pub fn new(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    /// Append to `path`, creating it if needed
    pub async fn append_to(path: impl AsRef<Path>) -> Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .await?;
        Ok(Self::new(file))
    }
}

#[async_trait]
impl MetricsSink for JsonLinesSink {
    async fn submit(&self, batch: &ComponentBatch) -> Result<()> {
        let mut line = serde_json::to_vec(batch)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(|e| CallstatError::Sink(format!("write failed: {e}")))?;
        writer
            .flush()
            .await
            .map_err(|e| CallstatError::Sink(format!("flush failed: {e}")))?;
        Ok(())
    }
}

/// Keeps accepted batches in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<ComponentBatch>>,
    accept_limit: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `accepted` batches, then reject every further submission
    pub fn failing_after(accepted: usize) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            accept_limit: Some(accepted),
        }
    }

    /// Accepted batches in submission order
    pub async fn batches(&self) -> Vec<ComponentBatch> {
        self.batches.lock().await.clone()
    }
}

#[async_trait]
impl MetricsSink for MemorySink {
    async fn submit(&self, batch: &ComponentBatch) -> Result<()> {
        let mut batches = self.batches.lock().await;
        if let Some(limit) = self.accept_limit
            && batches.len() >= limit
        {
            return Err(CallstatError::Sink(format!(
                "rejected {} for {}",
                batch.component, batch.date
            )));
        }

        debug!("Accepted {} for {}", batch.component, batch.date);
        batches.push(batch.clone());
        Ok(())
    }
}

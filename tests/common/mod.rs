//! Common test utilities and helpers for callstat tests
//!
//! Snapshot builders, a source that can be told to fail, and a harness that
//! wires a reporter to a manual clock, an in-memory sink and a file-backed
//! checkpoint store.

use async_trait::async_trait;
use callstat::{
    CallstatError, DailyDate, ISOTimestamp, Result,
    clock::ManualClock,
    driver::Reporter,
    provider::DataLoader,
    sinks::MemorySink,
    source::{MetricsSource, UsageRecord},
    store::FileCheckpointStore,
};
use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// UTC instant from calendar fields
pub fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> ISOTimestamp {
    ISOTimestamp::new(Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap())
}

pub fn date(s: &str) -> DailyDate {
    DailyDate::parse(s).unwrap()
}

/// Builder for day snapshot files read by the fixture provider
pub struct SnapshotBuilder {
    calls: Vec<(String, u64)>,
    messages: Vec<String>,
    usage: Vec<serde_json::Value>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            messages: Vec::new(),
            usage: Vec::new(),
        }
    }

    pub fn with_calls(mut self, status: &str, count: u64) -> Self {
        self.calls.push((status.to_string(), count));
        self
    }

    pub fn with_messages(mut self, status: &str, count: usize) -> Self {
        self.messages
            .extend(std::iter::repeat_n(status.to_string(), count));
        self
    }

    #[allow(dead_code)]
    pub fn with_usage(mut self, record: serde_json::Value) -> Self {
        self.usage.push(record);
        self
    }

    /// Write the snapshot as `<dir>/<date>.json`
    pub fn write(self, dir: &Path, date: &str) {
        let calls: serde_json::Map<String, serde_json::Value> = self
            .calls
            .into_iter()
            .map(|(status, count)| (status, count.into()))
            .collect();
        let doc = serde_json::json!({
            "calls": calls,
            "messages": self.messages,
            "usage": self.usage,
        });
        std::fs::write(
            dir.join(format!("{date}.json")),
            serde_json::to_string_pretty(&doc).unwrap(),
        )
        .unwrap();
    }
}

/// Wraps a source and fails every query for selected dates
pub struct FlakySource {
    inner: Arc<dyn MetricsSource>,
    failing: Mutex<HashSet<DailyDate>>,
}

impl FlakySource {
    pub fn new(inner: Arc<dyn MetricsSource>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_on(&self, date: DailyDate) {
        self.failing.lock().unwrap().insert(date);
    }

    #[allow(dead_code)]
    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn check(&self, date: DailyDate) -> Result<()> {
        if self.failing.lock().unwrap().contains(&date) {
            return Err(CallstatError::Source(format!("HTTP 503 for {date}")));
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsSource for FlakySource {
    async fn count_calls(&self, date: DailyDate, status: &str) -> Result<u64> {
        self.check(date)?;
        self.inner.count_calls(date, status).await
    }

    async fn message_statuses(&self, date: DailyDate) -> Result<Vec<String>> {
        self.check(date)?;
        self.inner.message_statuses(date).await
    }

    async fn usage_records(&self, date: DailyDate) -> Result<Vec<UsageRecord>> {
        self.check(date)?;
        self.inner.usage_records(date).await
    }
}

/// Everything a driver test needs, kept alive together
pub struct Harness {
    pub snapshots: TempDir,
    pub state: TempDir,
    pub clock: Arc<ManualClock>,
    pub sink: Arc<MemorySink>,
    pub store: Arc<FileCheckpointStore>,
    pub source: Arc<DataLoader>,
}

impl Harness {
    pub fn new(start: ISOTimestamp) -> Self {
        let snapshots = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let store = Arc::new(FileCheckpointStore::new(
            state.path().join("checkpoints.json"),
        ));
        let source = Arc::new(DataLoader::with_dir(snapshots.path()));

        Self {
            snapshots,
            state,
            clock: Arc::new(ManualClock::new(start)),
            sink: Arc::new(MemorySink::new()),
            store,
            source,
        }
    }

    /// Reporter over this harness with default limits
    pub fn reporter(&self) -> Reporter {
        Reporter::new(self.sink.clone(), self.store.clone()).with_clock(self.clock.clone())
    }

    /// Fresh store handle reading the same checkpoint file
    pub fn reopen_store(&self) -> FileCheckpointStore {
        FileCheckpointStore::new(self.state.path().join("checkpoints.json"))
    }
}

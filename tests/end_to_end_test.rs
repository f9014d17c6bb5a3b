//! End-to-end tests for callstat
//!
//! These tests drive the reporter over snapshot files, a checkpoint file and
//! a manual clock, covering first runs, midnight crossings and failures.

mod common;

use callstat::{
    CallstatError,
    checkpoint::{CheckpointStore, checkpoint_key},
    collectors::StockComponent,
    config::AgentConfig,
    driver::Reporter,
    metric::MetricValue,
    sinks::MemorySink,
    store::FileCheckpointStore,
    timezone::TimezoneConfig,
};
use common::{FlakySource, Harness, SnapshotBuilder, date, ts};
use std::sync::Arc;
use std::time::Duration;

const CALLS: &str = "Today Calls by Status_previously_processed_at";

#[tokio::test]
async fn test_first_run_reports_today_only() {
    let h = Harness::new(ts(2024, 1, 2, 10, 0, 0));
    SnapshotBuilder::new()
        .with_calls("completed", 41)
        .with_calls("no-answer", 3)
        .write(h.snapshots.path(), "2024-01-02");

    let component = StockComponent::CallsByStatus.build(h.source.clone());
    let summary = h.reporter().run_component(&component).await.unwrap();

    let batches = h.sink.batches().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].component, "Today Calls by Status");
    assert_eq!(batches[0].date, date("2024-01-02"));
    assert_eq!(batches[0].duration_secs, 3600);
    assert_eq!(batches[0].metrics.len(), 8);

    let completed = batches[0]
        .metrics
        .iter()
        .find(|m| m.name == "Completed")
        .unwrap();
    assert_eq!(completed.value, MetricValue::Count(41));
    assert_eq!(completed.unit, "calls");

    assert_eq!(summary.checkpoint, ts(2024, 1, 2, 10, 0, 0));
    assert_eq!(
        h.reopen_store().get(CALLS).await.unwrap(),
        Some(ts(2024, 1, 2, 10, 0, 0))
    );
}

#[tokio::test]
async fn test_midnight_crossing_flushes_yesterday_first() {
    let h = Harness::new(ts(2024, 1, 1, 23, 50, 0));
    SnapshotBuilder::new()
        .with_calls("completed", 120)
        .write(h.snapshots.path(), "2024-01-01");
    SnapshotBuilder::new()
        .with_calls("completed", 2)
        .write(h.snapshots.path(), "2024-01-02");

    let component = StockComponent::CallsByStatus.build(h.source.clone());
    let reporter = h.reporter().with_submission_spacing(Duration::ZERO);
    reporter.run_component(&component).await.unwrap();

    h.clock.set(ts(2024, 1, 2, 0, 5, 0));
    let summary = reporter.run_component(&component).await.unwrap();

    let batches = h.sink.batches().await;
    assert_eq!(batches.len(), 3);

    // 23:50 to 00:05 lands entirely on yesterday's batch
    assert_eq!(batches[1].date, date("2024-01-01"));
    assert_eq!(batches[1].duration_secs, 900);
    assert_eq!(batches[2].date, date("2024-01-02"));
    assert_eq!(batches[2].duration_secs, 300);

    assert_eq!(summary.dates.len(), 2);
    assert_eq!(summary.checkpoint, ts(2024, 1, 2, 0, 5, 0));
    assert!(h.clock.slept().is_empty());
}

#[tokio::test]
async fn test_backlog_submissions_are_spaced() {
    let h = Harness::new(ts(2024, 1, 2, 0, 5, 0));
    h.store.put(CALLS, ts(2024, 1, 1, 23, 50, 0)).await.unwrap();

    let component = StockComponent::CallsByStatus.build(h.source.clone());
    let summary = h.reporter().run_component(&component).await.unwrap();

    assert_eq!(h.clock.slept(), vec![Duration::from_secs(30)]);
    assert_eq!(summary.dates[0].processed_at, ts(2024, 1, 2, 0, 5, 0));
    assert_eq!(summary.dates[1].processed_at, ts(2024, 1, 2, 0, 5, 30));
    assert_eq!(summary.dates[1].duration_secs, 330);
}

#[tokio::test]
async fn test_long_outage_never_looks_past_yesterday() {
    let h = Harness::new(ts(2024, 1, 10, 8, 0, 0));
    h.store.put(CALLS, ts(2023, 12, 20, 12, 0, 0)).await.unwrap();

    let component = StockComponent::CallsByStatus.build(h.source.clone());
    let summary = h
        .reporter()
        .with_submission_spacing(Duration::ZERO)
        .run_component(&component)
        .await
        .unwrap();

    let dates: Vec<String> = summary.dates.iter().map(|d| d.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-01-09", "2024-01-10"]);
    // Both intervals exceed the backend's hour and are capped
    assert_eq!(summary.dates[0].duration_secs, 3600);
    assert_eq!(summary.dates[1].duration_secs, 3600);
}

#[tokio::test]
async fn test_rerun_at_same_instant_reports_zero_duration() {
    let h = Harness::new(ts(2024, 1, 2, 10, 0, 0));
    let component = StockComponent::CallsByStatus.build(h.source.clone());
    let reporter = h.reporter();

    reporter.run_component(&component).await.unwrap();
    let second = reporter.run_component(&component).await.unwrap();

    assert_eq!(second.dates.len(), 1);
    assert_eq!(second.dates[0].date, date("2024-01-02"));
    assert_eq!(second.dates[0].duration_secs, 0);
    assert_eq!(second.checkpoint, ts(2024, 1, 2, 10, 0, 0));
}

#[tokio::test]
async fn test_source_failure_keeps_checkpoint_and_recovers() {
    let h = Harness::new(ts(2024, 1, 2, 0, 5, 0));
    let before = ts(2024, 1, 1, 23, 50, 0);
    h.store.put(CALLS, before).await.unwrap();

    let source = Arc::new(FlakySource::new(h.source.clone()));
    source.fail_on(date("2024-01-01"));
    let component = StockComponent::CallsByStatus.build(source.clone());
    let reporter = h.reporter().with_submission_spacing(Duration::ZERO);

    let result = reporter.run_component(&component).await;
    assert!(matches!(result, Err(CallstatError::Source(_))));
    assert!(h.sink.batches().await.is_empty());
    assert_eq!(h.reopen_store().get(CALLS).await.unwrap(), Some(before));

    // The next run replays the same window
    source.heal();
    h.clock.advance(Duration::from_secs(600));
    let summary = reporter.run_component(&component).await.unwrap();

    assert_eq!(summary.dates[0].date, date("2024-01-01"));
    assert_eq!(summary.dates[0].duration_secs, 1500);
    assert_eq!(summary.dates[1].duration_secs, 900);
}

#[tokio::test]
async fn test_sink_rejection_keeps_checkpoint() {
    let h = Harness::new(ts(2024, 1, 2, 0, 5, 0));
    let before = ts(2024, 1, 1, 23, 50, 0);
    h.store.put(CALLS, before).await.unwrap();

    let sink = Arc::new(MemorySink::failing_after(1));
    let reporter = Reporter::new(sink.clone(), h.store.clone()).with_clock(h.clock.clone());
    let component = StockComponent::CallsByStatus.build(h.source.clone());

    let result = reporter.run_component(&component).await;

    assert!(matches!(result, Err(CallstatError::Sink(_))));
    // Yesterday was delivered; it will be delivered again next time
    assert_eq!(sink.batches().await.len(), 1);
    assert_eq!(h.reopen_store().get(CALLS).await.unwrap(), Some(before));
}

#[tokio::test]
async fn test_corrupt_checkpoint_file() {
    let h = Harness::new(ts(2024, 1, 2, 10, 0, 0));
    std::fs::write(h.store.path(), "{ not json").unwrap();
    let component = StockComponent::CallsByStatus.build(h.source.clone());

    let result = h.reporter().run_component(&component).await;
    assert!(matches!(result, Err(CallstatError::Parse { .. })));
    assert!(h.sink.batches().await.is_empty());

    let config = AgentConfig::from_json_str(r#"{"checkpoint_read_policy": "assume-first-run"}"#)
        .unwrap();
    let reporter = Reporter::from_config(&config, h.sink.clone(), h.store.clone())
        .unwrap()
        .with_clock(h.clock.clone());
    let summary = reporter.run_component(&component).await;

    // The run itself succeeds; persisting still trips over the corrupt file
    assert!(matches!(summary, Err(CallstatError::Parse { .. })));
    assert_eq!(h.sink.batches().await.len(), 1);
    assert_eq!(h.sink.batches().await[0].duration_secs, 3600);
}

#[tokio::test]
async fn test_all_stock_components_from_config() {
    let h = Harness::new(ts(2024, 1, 2, 10, 0, 0));
    SnapshotBuilder::new()
        .with_calls("completed", 5)
        .with_messages("sent", 4)
        .with_messages("delivered", 2)
        .with_usage(serde_json::json!({
            "category": "sms",
            "count": 6,
            "count_unit": "messages",
            "price": 0.045,
            "price_unit": "usd"
        }))
        .write(h.snapshots.path(), "2024-01-02");

    let config = AgentConfig::default();
    let reporter = Reporter::from_config(&config, h.sink.clone(), h.store.clone())
        .unwrap()
        .with_clock(h.clock.clone());
    let components = config.build_components(h.source.clone());
    let summaries = reporter.run_all(&components).await.unwrap();

    assert_eq!(summaries.len(), 3);
    let batches = h.sink.batches().await;
    let names: Vec<&str> = batches.iter().map(|b| b.component.as_str()).collect();
    assert_eq!(
        names,
        vec!["Today Calls by Status", "Today SMSs by Status", "Today Usage"]
    );

    let sms = &batches[1].metrics;
    assert_eq!(sms.len(), 6);
    assert_eq!(sms[2].name, "Sent");
    assert_eq!(sms[2].value, MetricValue::Count(4));
    assert_eq!(sms[5].name, "Delivered");
    assert_eq!(sms[5].value, MetricValue::Count(2));

    let usage: Vec<&str> = batches[2].metrics.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(usage, vec!["Sms Count", "Sms Price"]);

    let store = h.reopen_store();
    for component in StockComponent::ALL {
        let key = checkpoint_key(component.display_name());
        assert_eq!(
            store.get(&key).await.unwrap(),
            Some(ts(2024, 1, 2, 10, 0, 0))
        );
    }
}

#[tokio::test]
async fn test_day_boundaries_follow_configured_timezone() {
    // 15:30Z is 00:30 on Jan 2 in Tokyo
    let h = Harness::new(ts(2024, 1, 1, 15, 30, 0));
    h.store.put(CALLS, ts(2024, 1, 1, 14, 50, 0)).await.unwrap();

    let tz = TimezoneConfig::from_name(Some("Asia/Tokyo")).unwrap();
    let component = StockComponent::CallsByStatus.build(h.source.clone());
    let summary = h
        .reporter()
        .with_timezone(tz)
        .with_submission_spacing(Duration::ZERO)
        .run_component(&component)
        .await
        .unwrap();

    assert_eq!(summary.dates[0].date, date("2024-01-01"));
    assert_eq!(summary.dates[0].duration_secs, 2400);
    assert_eq!(summary.dates[1].date, date("2024-01-02"));
    // Measured from Tokyo midnight, 15:00Z
    assert_eq!(summary.dates[1].duration_secs, 1800);
}

#[tokio::test]
async fn test_checkpoints_survive_store_reopen() {
    let h = Harness::new(ts(2024, 1, 2, 10, 0, 0));
    let component = StockComponent::Usage.build(h.source.clone());
    h.reporter().run_component(&component).await.unwrap();

    let reopened = FileCheckpointStore::new(h.store.path());
    assert_eq!(
        reopened
            .get("Today Usage_previously_processed_at")
            .await
            .unwrap(),
        Some(ts(2024, 1, 2, 10, 0, 0))
    );
}

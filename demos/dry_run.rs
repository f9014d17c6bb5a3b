//! Report every configured component once, printing batches as JSON lines
//!
//! ```text
//! CALLSTAT_FIXTURE_DIR=./snapshots cargo run --example dry_run -- callstat.json
//! ```
//!
//! Without a configuration path the defaults apply. Logs go to stderr so
//! stdout only carries the submitted batches.

use callstat::{
    Result,
    config::AgentConfig,
    driver::Reporter,
    provider::DataLoader,
    sinks::JsonLinesSink,
    store::FileCheckpointStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("callstat=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => AgentConfig::load(path).await?,
        None => {
            let mut config = AgentConfig::default();
            config.apply_env_overrides()?;
            config.validate()?;
            config
        }
    };

    let source = Arc::new(DataLoader::new()?);
    let store = Arc::new(FileCheckpointStore::from_env()?);
    info!(
        "Reading snapshots from {}, checkpoints in {}",
        source.snapshots_dir().display(),
        store.path().display()
    );

    let reporter = Reporter::from_config(&config, Arc::new(JsonLinesSink::stdout()), store)?;
    let summaries = reporter.run_all(&config.build_components(source)).await?;

    for summary in &summaries {
        info!(
            "{}: {} date(s), checkpoint {}",
            summary.component,
            summary.dates.len(),
            summary.checkpoint
        );
    }
    Ok(())
}

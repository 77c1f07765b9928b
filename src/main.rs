//! Stormwatch - aggregates public hazard feeds into geospatial snapshots.
//!
//! The binary wires the aggregator to a JSON-lines sink on stdout and
//! polls on a fixed interval. Configuration comes from environment
//! variables:
//!
//! - `STORMWATCH_CONTACT` - identifying User-Agent for the public feeds
//! - `STORMWATCH_REFRESH_SECONDS` - delay between poll cycles
//! - `STORMWATCH_MAX_RUNTIME_HOURS` - failsafe stop, 0 to run forever

use std::env;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stormwatch::config::PollConfig;
use stormwatch::orchestrator::Aggregator;
use stormwatch::sink::JsonLinesSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("stormwatch=info".parse()?))
        .init();

    // Load configuration from environment
    let mut config = PollConfig::default();
    if let Ok(contact) = env::var("STORMWATCH_CONTACT") {
        config.contact = contact;
    }
    if let Some(seconds) = env::var("STORMWATCH_REFRESH_SECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        config.refresh_interval = Duration::from_secs(seconds);
    }
    if let Some(hours) = env::var("STORMWATCH_MAX_RUNTIME_HOURS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        config.max_runtime = (hours > 0).then(|| Duration::from_secs(hours * 3600));
    }

    info!(
        refresh_seconds = config.refresh_interval.as_secs(),
        contact = %config.contact,
        "starting stormwatch poller"
    );

    let aggregator = Aggregator::new(config)?;
    let mut sink = JsonLinesSink::stdout();
    aggregator.run(&mut sink).await
}

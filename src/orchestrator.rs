//! Fetch orchestration and the poll loop.
//!
//! Every adapter runs as an independent spawned task over the shared,
//! semaphore-bounded fetch client. Adapters have no ordering or mutual
//! visibility; a slow or failing source never blocks its siblings, and the
//! cycle waits for all of them before assembly. There is no cycle-wide
//! deadline beyond each request's own timeout and retry budget.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::PollConfig;
use crate::fetch::FetchClient;
use crate::model::{SourceId, SourceOutcome, SourceReport};
use crate::sink::RenderSink;
use crate::snapshot::{Snapshot, assemble};
use crate::sources::{
    AlertAdapter, CycloneAdapter, RadarAdapter, SeismicAdapter, SevereReportAdapter,
    VolcanoAdapter, WildfireAdapter,
};

/// Drives all source adapters and assembles one snapshot per cycle.
#[derive(Clone)]
pub struct Aggregator {
    client: Arc<FetchClient>,
    config: Arc<PollConfig>,
}

impl Aggregator {
    /// Create an aggregator backed by the real HTTP transport.
    pub fn new(config: PollConfig) -> anyhow::Result<Self> {
        let client = Arc::new(FetchClient::new(&config)?);
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Create an aggregator over a caller-supplied client (for testing).
    pub fn with_client(config: PollConfig, client: Arc<FetchClient>) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Run one full poll cycle and assemble the snapshot.
    pub async fn poll_once(&self) -> Snapshot {
        let tasks: Vec<(SourceId, JoinHandle<SourceReport>)> = vec![
            (SourceId::Radar, self.spawn_radar()),
            (SourceId::Volcanoes, self.spawn_volcanoes()),
            (SourceId::Alerts, self.spawn_alerts()),
            (SourceId::SevereReports, self.spawn_severe_reports()),
            (SourceId::Earthquakes, self.spawn_earthquakes()),
            (SourceId::Wildfires, self.spawn_wildfires()),
            (SourceId::Cyclones, self.spawn_cyclones()),
        ];

        let mut reports = Vec::with_capacity(tasks.len());
        for (source, handle) in tasks {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(source = source.label(), error = %e, "source task aborted");
                    reports.push(SourceReport {
                        source,
                        events: Vec::new(),
                        radar: None,
                        outcome: SourceOutcome {
                            attempted: 1,
                            succeeded: 0,
                            error: None,
                        },
                    });
                }
            }
        }

        let snapshot = assemble(reports, Utc::now());
        for stats in &snapshot.per_source_stats {
            if let Some(kind) = stats.error {
                warn!(
                    source = stats.source.label(),
                    attempted = stats.attempted,
                    succeeded = stats.succeeded,
                    error = ?kind,
                    "source degraded"
                );
            }
        }
        info!(
            events = snapshot.events.len(),
            radar = snapshot.radar.is_some(),
            "poll cycle assembled"
        );
        snapshot
    }

    /// Poll on the configured interval, handing each snapshot to the sink.
    /// Stops once the max-runtime failsafe elapses, if one is configured.
    pub async fn run<S: RenderSink>(&self, sink: &mut S) -> anyhow::Result<()> {
        let started = Instant::now();
        loop {
            let snapshot = self.poll_once().await;
            if let Err(e) = sink.render(&snapshot) {
                warn!(error = %e, "render sink failed");
            }

            if let Some(max_runtime) = self.config.max_runtime {
                if started.elapsed() >= max_runtime {
                    info!("max runtime reached, stopping");
                    return Ok(());
                }
            }
            tokio::time::sleep(self.config.refresh_interval).await;
        }
    }

    fn spawn_radar(&self) -> JoinHandle<SourceReport> {
        let client = self.client.clone();
        let adapter = RadarAdapter::new(&self.config);
        tokio::spawn(async move { adapter.collect(&client).await })
    }

    fn spawn_volcanoes(&self) -> JoinHandle<SourceReport> {
        let client = self.client.clone();
        let adapter = VolcanoAdapter::new(&self.config);
        tokio::spawn(async move { adapter.collect(&client).await })
    }

    fn spawn_alerts(&self) -> JoinHandle<SourceReport> {
        let client = self.client.clone();
        let adapter = AlertAdapter::new(&self.config);
        tokio::spawn(async move { adapter.collect(&client).await })
    }

    fn spawn_severe_reports(&self) -> JoinHandle<SourceReport> {
        let client = self.client.clone();
        let adapter = SevereReportAdapter::new(&self.config);
        tokio::spawn(async move { adapter.collect(&client).await })
    }

    fn spawn_earthquakes(&self) -> JoinHandle<SourceReport> {
        let client = self.client.clone();
        let adapter = SeismicAdapter::new(&self.config);
        tokio::spawn(async move { adapter.collect(&client).await })
    }

    fn spawn_wildfires(&self) -> JoinHandle<SourceReport> {
        let client = self.client.clone();
        let adapter = WildfireAdapter::new(&self.config);
        tokio::spawn(async move { adapter.collect(&client).await })
    }

    fn spawn_cyclones(&self) -> JoinHandle<SourceReport> {
        let client = self.client.clone();
        let adapter = CycloneAdapter::new(&self.config);
        tokio::spawn(async move { adapter.collect(&client).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fetch::testing::FakeTransport;
    use crate::model::HazardCategory;

    /// Config with every feed routed to a distinct test URL.
    fn test_config() -> PollConfig {
        let mut config = PollConfig::default();
        config.feeds.radar_index = "https://feeds.test/radar.json".to_string();
        config.feeds.alerts = "https://feeds.test/alerts".to_string();
        config.feeds.quakes = [
            "https://feeds.test/quakes_low.geojson".to_string(),
            "https://feeds.test/quakes_high.geojson".to_string(),
        ];
        config.feeds.wildfires = "https://feeds.test/fires.csv".to_string();
        config.feeds.cyclones = "https://feeds.test/storms.json".to_string();
        config.feeds.volcanoes = "https://feeds.test/volcanoes".to_string();
        config.feeds.severe_reports = "https://feeds.test/reports".to_string();
        config
    }

    fn aggregator(transport: Arc<FakeTransport>) -> Aggregator {
        let config = test_config();
        let client = Arc::new(FetchClient::with_transport(transport, &config));
        Aggregator::with_client(config, client)
    }

    #[tokio::test]
    async fn test_one_failing_source_never_blocks_the_others() {
        let transport = Arc::new(FakeTransport::new());
        // Volcanoes succeed; everything else 404s (the fake's default).
        transport.push_ok(
            "https://feeds.test/volcanoes",
            r#"{"events": [{"title": "Etna", "geometry": [{"coordinates": [14.99, 37.75]}]}]}"#,
        );

        let snapshot = aggregator(transport).poll_once().await;

        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(snapshot.events[0].category, HazardCategory::Volcano);
        assert_eq!(snapshot.per_source_stats.len(), 7);

        let volcano_stats = snapshot
            .per_source_stats
            .iter()
            .find(|s| s.source == SourceId::Volcanoes)
            .unwrap();
        assert!(volcano_stats.error.is_none());

        let cyclone_stats = snapshot
            .per_source_stats
            .iter()
            .find(|s| s.source == SourceId::Cyclones)
            .unwrap();
        assert_eq!(cyclone_stats.error, Some(ErrorKind::Http));
    }

    #[tokio::test]
    async fn test_every_source_failing_still_produces_a_snapshot() {
        let transport = Arc::new(FakeTransport::new());

        let snapshot = aggregator(transport).poll_once().await;

        assert!(snapshot.events.is_empty());
        assert!(snapshot.radar.is_none());
        assert_eq!(snapshot.per_source_stats.len(), 7);
        assert!(
            snapshot
                .per_source_stats
                .iter()
                .all(|s| s.succeeded == 0 && s.error == Some(ErrorKind::Http))
        );
    }
}

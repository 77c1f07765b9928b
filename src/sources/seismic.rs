//! Earthquake adapter.
//!
//! Two magnitude-threshold GeoJSON feeds are fetched concurrently and
//! merged. A feature without a magnitude is dropped; the third coordinate,
//! when present, is the hypocenter depth feeding the felt-area
//! attenuation.

use chrono::DateTime;
use serde::Deserialize;

use crate::config::PollConfig;
use crate::error::ErrorKind;
use crate::estimate::seismic_radius_km;
use crate::fetch::FetchClient;
use crate::model::{HazardCategory, HazardEvent, Position, SourceId, SourceOutcome, SourceReport};

#[derive(Debug, Deserialize)]
struct QuakeFeed {
    #[serde(default)]
    features: Vec<QuakeFeature>,
}

#[derive(Debug, Deserialize)]
struct QuakeFeature {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    properties: QuakeProperties,
    #[serde(default)]
    geometry: Option<QuakeGeometry>,
}

#[derive(Debug, Default, Deserialize)]
struct QuakeProperties {
    #[serde(default)]
    mag: Option<f64>,
    #[serde(default)]
    place: Option<String>,
    /// Origin time in epoch milliseconds.
    #[serde(default)]
    time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct QuakeGeometry {
    /// [lon, lat, depth_km]
    #[serde(default)]
    coordinates: Vec<f64>,
}

/// Adapter for the paired earthquake feeds.
#[derive(Debug, Clone)]
pub struct SeismicAdapter {
    urls: [String; 2],
}

impl SeismicAdapter {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            urls: config.feeds.quakes.clone(),
        }
    }

    pub async fn collect(&self, client: &FetchClient) -> SourceReport {
        let (low, high) = tokio::join!(
            client.get_json::<QuakeFeed>(&self.urls[0]),
            client.get_json::<QuakeFeed>(&self.urls[1]),
        );

        let mut events = Vec::new();
        let mut succeeded = 0;
        let mut error: Option<ErrorKind> = None;
        for result in [low, high] {
            match result {
                Ok(feed) => {
                    succeeded += 1;
                    events.extend(feed.features.into_iter().filter_map(parse_quake));
                }
                Err(e) => {
                    if error.is_none() {
                        error = Some(e.kind());
                    }
                }
            }
        }

        SourceReport::events(
            SourceId::Earthquakes,
            events,
            SourceOutcome {
                attempted: 2,
                succeeded,
                error,
            },
        )
    }
}

fn parse_quake(feature: QuakeFeature) -> Option<HazardEvent> {
    let geometry = feature.geometry?;
    let lon = geometry.coordinates.first().copied()?;
    let lat = geometry.coordinates.get(1).copied()?;
    let magnitude = feature.properties.mag?;
    let depth_km = geometry.coordinates.get(2).copied();

    let position = Position::new(lat, lon).ok()?;
    let radius_km = seismic_radius_km(magnitude, depth_km);

    let mut event = HazardEvent::new(HazardCategory::Seismic, position)
        .with_radius_m(radius_km * 1000.0)
        .with_severity(magnitude)
        .with_attribute("magnitude", &format!("{magnitude:.1}"));
    if let Some(place) = feature.properties.place.as_deref() {
        event = event.with_attribute("place", place);
    }
    if let Some(id) = feature.id.as_deref() {
        event = event.with_source_id(id);
    }
    if let Some(time) = feature.properties.time {
        if let Some(timestamp) = DateTime::from_timestamp_millis(time) {
            event = event.with_timestamp(timestamp);
        }
    }
    Some(event)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fetch::testing::FakeTransport;

    const LOW_URL: &str = "https://quakes.test/2.5_day.geojson";
    const HIGH_URL: &str = "https://quakes.test/4.5_day.geojson";

    fn adapter() -> SeismicAdapter {
        let mut config = PollConfig::default();
        config.feeds.quakes = [LOW_URL.to_string(), HIGH_URL.to_string()];
        SeismicAdapter::new(&config)
    }

    fn client(transport: Arc<FakeTransport>) -> FetchClient {
        FetchClient::with_transport(transport, &PollConfig::default())
    }

    const EMPTY_FEED: &str = r#"{"features": []}"#;

    #[tokio::test]
    async fn test_feeds_merged_and_radius_estimated() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(
            LOW_URL,
            r#"{
                "features": [{
                    "id": "us7000abcd",
                    "properties": {"mag": 6.0, "place": "22 km SSW of Somewhere", "time": 1754500000000},
                    "geometry": {"coordinates": [142.3, 38.1, 10.0]}
                }]
            }"#,
        );
        transport.push_ok(
            HIGH_URL,
            r#"{
                "features": [{
                    "id": "us7000efgh",
                    "properties": {"mag": 4.8, "time": 1754500100000},
                    "geometry": {"coordinates": [-70.5, -33.2, 95.0]}
                }]
            }"#,
        );

        let report = adapter().collect(&client(transport)).await;

        assert_eq!(report.events.len(), 2);
        assert_eq!(report.outcome.attempted, 2);
        assert_eq!(report.outcome.succeeded, 2);

        let shallow = report
            .events
            .iter()
            .find(|e| e.raw_source_id.as_deref() == Some("us7000abcd"))
            .unwrap();
        // M 6.0, 10 km depth: felt-area radius ≈ 78.8 km.
        let radius_m = shallow.impact_radius_m.unwrap();
        assert!((radius_m - 78_770.0).abs() < 100.0, "got {radius_m}");
        assert_eq!(shallow.severity, Some(6.0));
        assert_eq!(shallow.source_timestamp.unwrap().timestamp(), 1_754_500_000);
    }

    #[tokio::test]
    async fn test_missing_magnitude_drops_record() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(
            LOW_URL,
            r#"{
                "features": [
                    {"properties": {"place": "nowhere"}, "geometry": {"coordinates": [10.0, 20.0, 5.0]}},
                    {"properties": {"mag": 3.1}, "geometry": {"coordinates": [11.0, 21.0]}}
                ]
            }"#,
        );
        transport.push_ok(HIGH_URL, EMPTY_FEED);

        let report = adapter().collect(&client(transport)).await;

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].severity, Some(3.1));
    }

    #[tokio::test]
    async fn test_one_failed_feed_keeps_the_other() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_status(LOW_URL, 404);
        transport.push_ok(
            HIGH_URL,
            r#"{
                "features": [{
                    "properties": {"mag": 5.2},
                    "geometry": {"coordinates": [25.0, 38.5, 12.0]}
                }]
            }"#,
        );

        let report = adapter().collect(&client(transport)).await;

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.outcome.succeeded, 1);
        assert_eq!(report.outcome.error, Some(ErrorKind::Http));
    }

    #[tokio::test]
    async fn test_out_of_range_position_dropped() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(
            LOW_URL,
            r#"{
                "features": [{
                    "properties": {"mag": 5.0},
                    "geometry": {"coordinates": [200.0, 38.5, 12.0]}
                }]
            }"#,
        );
        transport.push_ok(HIGH_URL, EMPTY_FEED);

        let report = adapter().collect(&client(transport)).await;

        assert!(report.events.is_empty());
        assert!(report.outcome.error.is_none());
    }
}

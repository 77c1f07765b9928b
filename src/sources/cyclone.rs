//! Tropical-cyclone adapter.
//!
//! The storm-list document spells the same data several ways depending on
//! basin and product age: the storm container is `currentStorms` or
//! `activeStorms`, wind shows up under four different names, and
//! coordinates may be hemisphere-suffixed strings. Alternates are modeled
//! as explicit optional fields resolved in a fixed candidate order.

use serde::Deserialize;
use serde_json::Value;

use crate::config::PollConfig;
use crate::coords::{parse_latitude, parse_longitude, to_float};
use crate::estimate::cyclone_radius_km;
use crate::fetch::FetchClient;
use crate::model::{HazardCategory, HazardEvent, Position, SourceId, SourceOutcome, SourceReport};

#[derive(Debug, Deserialize)]
struct StormList {
    #[serde(default, rename = "currentStorms")]
    current_storms: Vec<StormRecord>,
    #[serde(default, rename = "activeStorms")]
    active_storms: Vec<StormRecord>,
}

impl StormList {
    fn storms(self) -> Vec<StormRecord> {
        if self.current_storms.is_empty() {
            self.active_storms
        } else {
            self.current_storms
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StormRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "binNumber")]
    bin_number: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "stormName")]
    storm_name: Option<String>,
    #[serde(default)]
    lat: Option<Value>,
    #[serde(default)]
    lon: Option<Value>,
    #[serde(default)]
    wind: Option<Value>,
    #[serde(default, rename = "maxWind")]
    max_wind: Option<Value>,
    #[serde(default)]
    intensity: Option<Value>,
    #[serde(default, rename = "sustainedWind")]
    sustained_wind: Option<Value>,
    #[serde(default)]
    sshs: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default, rename = "stormType")]
    storm_type: Option<String>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl StormRecord {
    /// Sustained wind in knots, first coercible candidate wins.
    fn wind_kt(&self) -> Option<f64> {
        [&self.wind, &self.max_wind, &self.intensity, &self.sustained_wind]
            .into_iter()
            .flatten()
            .find_map(to_float)
    }

    fn saffir_simpson(&self) -> Option<i64> {
        self.sshs.as_ref().and_then(to_float).map(|v| v as i64)
    }

    fn status_label(&self) -> Option<&str> {
        [&self.kind, &self.storm_type, &self.class, &self.status]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
    }

    fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.storm_name.as_deref())
            .unwrap_or("Storm")
    }

    fn source_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.bin_number.as_deref())
    }
}

/// Adapter for the storm-list feed.
#[derive(Debug, Clone)]
pub struct CycloneAdapter {
    url: String,
    default_radius_km: f64,
}

impl CycloneAdapter {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            url: config.feeds.cyclones.clone(),
            default_radius_km: config.cyclone_default_radius_km,
        }
    }

    pub async fn collect(&self, client: &FetchClient) -> SourceReport {
        let list: StormList = match client.get_json(&self.url).await {
            Ok(list) => list,
            Err(e) => return SourceReport::failed(SourceId::Cyclones, 1, &e),
        };

        let events = list
            .storms()
            .into_iter()
            .filter_map(|storm| self.parse_storm(storm))
            .collect();

        SourceReport::events(SourceId::Cyclones, events, SourceOutcome::success(1))
    }

    fn parse_storm(&self, storm: StormRecord) -> Option<HazardEvent> {
        let lat = parse_latitude(storm.lat.as_ref()?).ok()?;
        let lon = parse_longitude(storm.lon.as_ref()?).ok()?;
        let position = Position::new(lat, lon).ok()?;

        let wind_kt = storm.wind_kt();
        let radius_km = cyclone_radius_km(
            wind_kt,
            storm.saffir_simpson(),
            storm.status_label(),
            self.default_radius_km,
        );

        let mut event = HazardEvent::new(HazardCategory::Cyclone, position)
            .with_radius_m(radius_km * 1000.0)
            .with_attribute("name", storm.display_name());
        if let Some(wind) = wind_kt {
            event = event
                .with_severity(wind)
                .with_attribute("wind_kt", &format!("{wind:.0}"));
        }
        if let Some(status) = storm.status_label() {
            event = event.with_attribute("status", status);
        }
        if let Some(id) = storm.source_id() {
            event = event.with_source_id(id);
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fetch::testing::FakeTransport;

    const URL: &str = "https://storms.test/current.json";

    fn adapter() -> CycloneAdapter {
        let mut config = PollConfig::default();
        config.feeds.cyclones = URL.to_string();
        CycloneAdapter::new(&config)
    }

    fn client(transport: Arc<FakeTransport>) -> FetchClient {
        FetchClient::with_transport(transport, &PollConfig::default())
    }

    #[tokio::test]
    async fn test_suffixed_coordinates_and_alternate_wind_field() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(
            URL,
            r#"{
                "currentStorms": [{
                    "id": "al052026",
                    "name": "ERNESTO",
                    "lat": "14.8N",
                    "lon": "55.2W",
                    "maxWind": "90",
                    "type": "HU"
                }]
            }"#,
        );

        let report = adapter().collect(&client(transport)).await;

        assert_eq!(report.events.len(), 1);
        let event = &report.events[0];
        assert_eq!(event.category, HazardCategory::Cyclone);
        assert_eq!(event.position.latitude, 14.8);
        assert_eq!(event.position.longitude, -55.2);
        // 90 kt lands in the "<96" band: 300 km.
        assert_eq!(event.impact_radius_m, Some(300_000.0));
        assert_eq!(event.severity, Some(90.0));
        assert_eq!(event.raw_source_id.as_deref(), Some("al052026"));
        assert_eq!(
            event.attributes.get("name").map(String::as_str),
            Some("ERNESTO")
        );
    }

    #[tokio::test]
    async fn test_active_storms_container_accepted() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(
            URL,
            r#"{
                "activeStorms": [{
                    "stormName": "HONE",
                    "lat": 18.2,
                    "lon": -155.0,
                    "sshs": 4
                }]
            }"#,
        );

        let report = adapter().collect(&client(transport)).await;

        assert_eq!(report.events.len(), 1);
        let event = &report.events[0];
        // No wind field: the category code map answers 420 km.
        assert_eq!(event.impact_radius_m, Some(420_000.0));
        assert!(event.severity.is_none());
        assert_eq!(
            event.attributes.get("name").map(String::as_str),
            Some("HONE")
        );
    }

    #[tokio::test]
    async fn test_status_cascade_and_default() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(
            URL,
            r#"{
                "currentStorms": [
                    {"name": "ONE", "lat": 12.0, "lon": -40.0, "stormType": "TD"},
                    {"name": "TWO", "lat": 13.0, "lon": -42.0}
                ]
            }"#,
        );

        let report = adapter().collect(&client(transport)).await;

        assert_eq!(report.events.len(), 2);
        assert_eq!(report.events[0].impact_radius_m, Some(120_000.0));
        // Nothing usable at all: configured default (200 km).
        assert_eq!(report.events[1].impact_radius_m, Some(200_000.0));
    }

    /// `"91N"` parses upstream but must be rejected before an event is
    /// constructed.
    #[tokio::test]
    async fn test_storm_without_coordinates_dropped() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(
            URL,
            r#"{
                "currentStorms": [
                    {"name": "GHOST", "lat": "somewhere", "lon": "55W"},
                    {"name": "POLAR", "lat": "91N", "lon": "60W", "wind": 40},
                    {"name": "REAL", "lat": "20N", "lon": "60W", "wind": 40}
                ]
            }"#,
        );

        let report = adapter().collect(&client(transport)).await;

        assert_eq!(report.events.len(), 1);
        assert_eq!(
            report.events[0].attributes.get("name").map(String::as_str),
            Some("REAL")
        );
    }
}

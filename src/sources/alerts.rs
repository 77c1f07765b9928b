//! Alert-polygon adapter.
//!
//! Reads the active-alerts feed (GeoJSON-like features) and keeps the
//! recognized warning/watch/advisory types only. A record must carry
//! geometry that reduces to at least one valid (lat, lon) vertex; the
//! full vertex sequence is retained on the event and the bounds midpoint
//! serves as its representative position.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::config::PollConfig;
use crate::fetch::FetchClient;
use crate::model::{HazardCategory, HazardEvent, Position, SourceId, SourceOutcome, SourceReport};
use crate::sources::{collect_lonlat, vertex_bounds};

/// Alert types kept on the map; everything else is ignored entirely.
const RECOGNIZED_EVENTS: [&str; 18] = [
    "Tornado Warning",
    "Tornado Watch",
    "Severe Thunderstorm Warning",
    "Severe Thunderstorm Watch",
    "Flash Flood Warning",
    "Flood Warning",
    "Hurricane Warning",
    "Hurricane Watch",
    "Tropical Storm Warning",
    "Winter Storm Warning",
    "Blizzard Warning",
    "Red Flag Warning",
    "Excessive Heat Warning",
    "High Wind Warning",
    "Special Marine Warning",
    "Tsunami Warning",
    "Tsunami Advisory",
    "Tsunami Watch",
];

#[derive(Debug, Deserialize)]
struct AlertCollection {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    properties: AlertProperties,
    #[serde(default)]
    geometry: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct AlertProperties {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default, rename = "areaDesc")]
    area_desc: Option<String>,
    #[serde(default)]
    sent: Option<String>,
}

/// Adapter for the alert-polygon feed.
#[derive(Debug, Clone)]
pub struct AlertAdapter {
    url: String,
}

impl AlertAdapter {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            url: config.feeds.alerts.clone(),
        }
    }

    pub async fn collect(&self, client: &FetchClient) -> SourceReport {
        let collection: AlertCollection = match client.get_json(&self.url).await {
            Ok(collection) => collection,
            Err(e) => return SourceReport::failed(SourceId::Alerts, 1, &e),
        };

        let events = collection
            .features
            .into_iter()
            .filter_map(parse_alert)
            .collect();

        SourceReport::events(SourceId::Alerts, events, SourceOutcome::success(1))
    }
}

fn parse_alert(feature: AlertFeature) -> Option<HazardEvent> {
    let event_name = feature.properties.event.as_deref()?;
    if !RECOGNIZED_EVENTS.contains(&event_name) {
        return None;
    }

    let geometry = feature.geometry?;
    let mut vertices = Vec::new();
    collect_lonlat(geometry.get("coordinates")?, &mut vertices);
    let (min_lat, max_lat, min_lon, max_lon) = vertex_bounds(&vertices)?;
    let position = Position::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0).ok()?;

    let mut event = HazardEvent::new(HazardCategory::AlertPolygon, position)
        .with_geometry(vertices)
        .with_attribute("event", event_name);
    if let Some(headline) = feature.properties.headline.as_deref() {
        event = event.with_attribute("headline", headline);
    }
    if let Some(area) = feature.properties.area_desc.as_deref() {
        event = event.with_attribute("area", area);
    }
    if let Some(id) = feature.id.as_deref() {
        event = event.with_source_id(id);
    }
    if let Some(sent) = feature.properties.sent.as_deref() {
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(sent) {
            event = event.with_timestamp(timestamp.with_timezone(&Utc));
        }
    }
    Some(event)
}

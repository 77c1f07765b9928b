//! Volcanic-activity adapter.
//!
//! Reads the open-events feed filtered to the volcano category. Every
//! geometry entry of every event becomes one point hazard with the fixed
//! volcano footprint.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::config::PollConfig;
use crate::coords::to_float;
use crate::estimate::VOLCANO_RADIUS_M;
use crate::fetch::FetchClient;
use crate::model::{HazardCategory, HazardEvent, Position, SourceId, SourceOutcome, SourceReport};

#[derive(Debug, Deserialize)]
struct OpenEventsFeed {
    #[serde(default)]
    events: Vec<OpenEvent>,
}

#[derive(Debug, Deserialize)]
struct OpenEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    geometry: Vec<EventGeometry>,
}

#[derive(Debug, Deserialize)]
struct EventGeometry {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    coordinates: Value,
}

/// Adapter for the open volcanic-activity feed.
#[derive(Debug, Clone)]
pub struct VolcanoAdapter {
    url: String,
}

impl VolcanoAdapter {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            url: config.feeds.volcanoes.clone(),
        }
    }

    pub async fn collect(&self, client: &FetchClient) -> SourceReport {
        let feed: OpenEventsFeed = match client.get_json(&self.url).await {
            Ok(feed) => feed,
            Err(e) => return SourceReport::failed(SourceId::Volcanoes, 1, &e),
        };

        let mut events = Vec::new();
        for open_event in feed.events {
            let title = open_event.title.as_deref().unwrap_or("Volcano Activity");
            for geometry in &open_event.geometry {
                if let Some(event) = parse_geometry(title, open_event.id.as_deref(), geometry) {
                    events.push(event);
                }
            }
        }

        SourceReport::events(SourceId::Volcanoes, events, SourceOutcome::success(1))
    }
}

fn parse_geometry(title: &str, id: Option<&str>, geometry: &EventGeometry) -> Option<HazardEvent> {
    let Value::Array(coords) = &geometry.coordinates else {
        return None;
    };
    let lon = coords.first().and_then(to_float)?;
    let lat = coords.get(1).and_then(to_float)?;
    let position = Position::new(lat, lon).ok()?;

    let mut event = HazardEvent::new(HazardCategory::Volcano, position)
        .with_radius_m(VOLCANO_RADIUS_M)
        .with_attribute("title", title);
    if let Some(id) = id {
        event = event.with_source_id(id);
    }
    if let Some(date) = geometry.date.as_deref() {
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(date) {
            event = event.with_timestamp(timestamp.with_timezone(&Utc));
        }
    }
    Some(event)
}

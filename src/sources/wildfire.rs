//! Wildfire-detection adapter.
//!
//! Reads the global delimited-text detection feed. Latitude and longitude
//! are required per row; the optional scan/track angles feed the sensor
//! footprint estimator, with a fixed fallback when they are absent.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::config::PollConfig;
use crate::estimate::wildfire_radius_m;
use crate::fetch::FetchClient;
use crate::model::{HazardCategory, HazardEvent, Position, SourceId, SourceOutcome, SourceReport};

#[derive(Debug, Deserialize)]
struct DetectionRow {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    scan: Option<f64>,
    #[serde(default)]
    track: Option<f64>,
    #[serde(default)]
    acq_date: Option<String>,
    #[serde(default)]
    acq_time: Option<String>,
}

/// Adapter for the wildfire-detection feed.
#[derive(Debug, Clone)]
pub struct WildfireAdapter {
    url: String,
}

impl WildfireAdapter {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            url: config.feeds.wildfires.clone(),
        }
    }

    pub async fn collect(&self, client: &FetchClient) -> SourceReport {
        let text = match client.get_text(&self.url).await {
            Ok(text) => text,
            Err(e) => return SourceReport::failed(SourceId::Wildfires, 1, &e),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut events = Vec::new();
        for row in reader.deserialize::<DetectionRow>() {
            let Ok(row) = row else { continue };
            if let Some(event) = parse_detection(row) {
                events.push(event);
            }
        }

        SourceReport::events(SourceId::Wildfires, events, SourceOutcome::success(1))
    }
}

fn parse_detection(row: DetectionRow) -> Option<HazardEvent> {
    let lat = row.latitude?;
    let lon = row.longitude?;
    let position = Position::new(lat, lon).ok()?;

    let radius_m = wildfire_radius_m(row.scan, row.track, lat);

    let mut event =
        HazardEvent::new(HazardCategory::Wildfire, position).with_radius_m(radius_m);
    if let Some(date) = row.acq_date.as_deref() {
        event = event.with_attribute("acquired", date);
        if let Some(timestamp) = acquisition_timestamp(date, row.acq_time.as_deref()) {
            event = event.with_timestamp(timestamp);
        }
    }
    Some(event)
}

/// Acquisition date plus the HHMM overpass time when it parses; the feed
/// zero-pads inconsistently, so pad before parsing.
fn acquisition_timestamp(date: &str, time: Option<&str>) -> Option<chrono::DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = time
        .and_then(|t| NaiveTime::parse_from_str(&format!("{:0>4}", t.trim()), "%H%M").ok())
        .unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time).and_utc())
}

//! Canonical data model: hazard events, radar frames, snapshots' building
//! blocks, and per-source outcome records.
//!
//! A [`HazardEvent`] is created by exactly one source adapter, lives only
//! inside one snapshot, and is never mutated after construction. Events
//! whose coordinates fall outside the valid range are dropped at
//! construction time ([`Position::new`]) rather than stored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ErrorKind, FetchError};

/// Hazard categories covered by the feed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardCategory {
    Seismic,
    Wildfire,
    Cyclone,
    Volcano,
    AlertPolygon,
    SevereReport,
}

/// A validated geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Construct a position, rejecting out-of-range or non-finite
    /// coordinates. Callers drop the owning record on failure.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, FetchError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(FetchError::Geometry(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(FetchError::Geometry(format!(
                "longitude out of range: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A single normalized hazard event.
#[derive(Debug, Clone, Serialize)]
pub struct HazardEvent {
    /// Hazard category, fixed by the adapter that produced the event.
    pub category: HazardCategory,

    /// Representative point for the event.
    pub position: Position,

    /// Estimated impact radius in meters; present for point hazards,
    /// absent for alert polygons.
    pub impact_radius_m: Option<f64>,

    /// Ordered (lon, lat) vertices; present only for alert polygons.
    pub geometry: Option<Vec<(f64, f64)>>,

    /// Source-specific intensity scalar (magnitude, wind knots), opaque
    /// beyond estimator use.
    pub severity: Option<f64>,

    /// Timestamp reported by the feed, when it carries one.
    pub source_timestamp: Option<DateTime<Utc>>,

    /// Feed-native record identifier, when the feed provides one.
    pub raw_source_id: Option<String>,

    /// Free-form display data, opaque to the core.
    pub attributes: BTreeMap<String, String>,
}

impl HazardEvent {
    /// Create a new event with the mandatory fields.
    pub fn new(category: HazardCategory, position: Position) -> Self {
        Self {
            category,
            position,
            impact_radius_m: None,
            geometry: None,
            severity: None,
            source_timestamp: None,
            raw_source_id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the estimated impact radius in meters.
    pub fn with_radius_m(mut self, radius_m: f64) -> Self {
        self.impact_radius_m = Some(radius_m);
        self
    }

    /// Attach the polygon vertex sequence.
    pub fn with_geometry(mut self, vertices: Vec<(f64, f64)>) -> Self {
        self.geometry = Some(vertices);
        self
    }

    /// Set the source-specific severity scalar.
    pub fn with_severity(mut self, severity: f64) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set the feed-reported timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.source_timestamp = Some(timestamp);
        self
    }

    /// Set the feed-native record identifier.
    pub fn with_source_id(mut self, id: &str) -> Self {
        self.raw_source_id = Some(id.to_string());
        self
    }

    /// Add a display attribute.
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

/// Descriptor for the latest radar mosaic frame. Not a point event: the
/// render sink uses it to parametrize a tile layer.
#[derive(Debug, Clone, Serialize)]
pub struct RadarFrame {
    /// Tile host, e.g. `https://tilecache.rainviewer.com`.
    pub host: String,

    /// Relative frame path as published by the index.
    pub path: String,

    /// Frame capture time.
    pub time: Option<DateTime<Utc>>,
}

impl RadarFrame {
    /// Tile URL template with literal `{z}`/`{x}`/`{y}` placeholders for
    /// the render sink to substitute.
    pub fn tile_url_template(&self) -> String {
        format!(
            "{}{}/256/{{z}}/{{x}}/{{y}}/2/1_1.png?color=3&smooth=1&noclutter=1",
            self.host, self.path
        )
    }
}

/// The feed sources contributing to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Radar,
    Volcanoes,
    Alerts,
    SevereReports,
    Earthquakes,
    Wildfires,
    Cyclones,
}

impl SourceId {
    /// Human-readable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            SourceId::Radar => "radar index",
            SourceId::Volcanoes => "volcanoes",
            SourceId::Alerts => "alert polygons",
            SourceId::SevereReports => "severe reports",
            SourceId::Earthquakes => "earthquakes",
            SourceId::Wildfires => "wildfires",
            SourceId::Cyclones => "cyclones",
        }
    }
}

/// Per-source fetch outcome. For multi-URL sources every sub-fetch counts
/// toward `attempted`/`succeeded`; partial failures keep their events and
/// record the first failure's kind.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SourceOutcome {
    pub attempted: u32,
    pub succeeded: u32,
    pub error: Option<ErrorKind>,
}

impl SourceOutcome {
    /// All sub-fetches succeeded.
    pub fn success(attempted: u32) -> Self {
        Self {
            attempted,
            succeeded: attempted,
            error: None,
        }
    }

    /// Every sub-fetch failed with the given kind.
    pub fn failure(attempted: u32, kind: ErrorKind) -> Self {
        Self {
            attempted,
            succeeded: 0,
            error: Some(kind),
        }
    }
}

/// Everything one adapter hands back for a cycle.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: SourceId,
    pub events: Vec<HazardEvent>,
    pub radar: Option<RadarFrame>,
    pub outcome: SourceOutcome,
}

impl SourceReport {
    /// Report a batch of events.
    pub fn events(source: SourceId, events: Vec<HazardEvent>, outcome: SourceOutcome) -> Self {
        Self {
            source,
            events,
            radar: None,
            outcome,
        }
    }

    /// Report a total source failure: zero events, outcome populated.
    pub fn failed(source: SourceId, attempted: u32, error: &FetchError) -> Self {
        Self {
            source,
            events: Vec::new(),
            radar: None,
            outcome: SourceOutcome::failure(attempted, error.kind()),
        }
    }

    /// Report a resolved radar frame (or none, when the index is empty).
    pub fn radar_frame(frame: Option<RadarFrame>, outcome: SourceOutcome) -> Self {
        Self {
            source: SourceId::Radar,
            events: Vec::new(),
            radar: frame,
            outcome,
        }
    }
}

/// Stats entry surfaced in the snapshot for one source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStats {
    pub source: SourceId,
    pub attempted: u32,
    pub succeeded: u32,
    pub error: Option<ErrorKind>,
}

impl SourceStats {
    pub fn new(source: SourceId, outcome: SourceOutcome) -> Self {
        Self {
            source,
            attempted: outcome.attempted,
            succeeded: outcome.succeeded,
            error: outcome.error,
        }
    }
}

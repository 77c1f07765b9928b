//! Poll configuration.
//!
//! Plain values consumed by the fetch client and the adapters; nothing in
//! the core depends on how they are loaded. Defaults point at the real
//! public endpoints, and every URL is overridable so tests can aim the
//! whole pipeline at a fake transport.

use std::time::Duration;

/// Default identifying User-Agent. Government endpoints ask for contact
/// info on automated clients; keep this accurate when deploying.
const DEFAULT_CONTACT: &str = "stormwatch/0.1 (contact: ops@stormwatch.example)";

/// Feed endpoints, one hazard category each.
#[derive(Debug, Clone)]
pub struct FeedUrls {
    /// Radar mosaic frame index.
    pub radar_index: String,

    /// Active alert polygons.
    pub alerts: String,

    /// Two magnitude-threshold earthquake feeds, fetched concurrently.
    pub quakes: [String; 2],

    /// Global wildfire-detection CSV.
    pub wildfires: String,

    /// Current tropical-cyclone list.
    pub cyclones: String,

    /// Open volcanic-activity events.
    pub volcanoes: String,

    /// Base directory for the severe-report CSVs (tornado/wind/hail,
    /// today plus previous-day fallback).
    pub severe_reports: String,
}

impl Default for FeedUrls {
    fn default() -> Self {
        Self {
            radar_index: "https://api.rainviewer.com/public/weather-maps.json".to_string(),
            alerts: "https://api.weather.gov/alerts/active".to_string(),
            quakes: [
                "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_day.geojson"
                    .to_string(),
                "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_day.geojson"
                    .to_string(),
            ],
            wildfires:
                "https://firms.modaps.eosdis.nasa.gov/data/active_fire/c6.1/csv/MODIS_C6_1_Global_24h.csv"
                    .to_string(),
            cyclones: "https://www.nhc.noaa.gov/CurrentStorms.json".to_string(),
            volcanoes:
                "https://eonet.gsfc.nasa.gov/api/v3/events?status=open&category=volcanoes&limit=200"
                    .to_string(),
            severe_reports: "https://www.spc.noaa.gov/climo/reports".to_string(),
        }
    }
}

/// Configuration for the poll cycle and the shared fetch client.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Identifying User-Agent attached to every request.
    pub contact: String,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Maximum concurrent requests across all adapters.
    pub max_concurrency: usize,

    /// Connection-pool size for the shared HTTP client.
    pub pool_size: usize,

    /// Delay between poll cycles.
    pub refresh_interval: Duration,

    /// Failsafe: stop polling after this long, if set.
    pub max_runtime: Option<Duration>,

    /// Cyclone radius (km) when no wind, category, or status is usable.
    pub cyclone_default_radius_km: f64,

    /// Feed endpoints.
    pub feeds: FeedUrls,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            contact: DEFAULT_CONTACT.to_string(),
            request_timeout: Duration::from_secs(12),
            max_concurrency: 6,
            pool_size: 20,
            refresh_interval: Duration::from_secs(120),
            max_runtime: Some(Duration::from_secs(12 * 3600)),
            cyclone_default_radius_km: 200.0,
            feeds: FeedUrls::default(),
        }
    }
}

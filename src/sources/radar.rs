//! Radar mosaic frame-index adapter.
//!
//! The index lists recently captured mosaic frames plus short-term
//! nowcast frames. The adapter resolves the latest usable frame into a
//! [`RadarFrame`] reference the render sink turns into a tile layer; it
//! produces no point events of its own.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::PollConfig;
use crate::fetch::FetchClient;
use crate::model::{RadarFrame, SourceId, SourceOutcome, SourceReport};

/// Tile host used when the index omits one.
const DEFAULT_TILE_HOST: &str = "https://tilecache.rainviewer.com";

#[derive(Debug, Deserialize)]
struct FrameIndex {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    radar: FrameSets,
}

#[derive(Debug, Default, Deserialize)]
struct FrameSets {
    #[serde(default)]
    past: Vec<FrameDescriptor>,
    #[serde(default)]
    nowcast: Vec<FrameDescriptor>,
}

#[derive(Debug, Deserialize)]
struct FrameDescriptor {
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    path: Option<String>,
}

/// Adapter for the radar-index feed.
#[derive(Debug, Clone)]
pub struct RadarAdapter {
    url: String,
}

impl RadarAdapter {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            url: config.feeds.radar_index.clone(),
        }
    }

    pub async fn collect(&self, client: &FetchClient) -> SourceReport {
        let index: FrameIndex = match client.get_json(&self.url).await {
            Ok(index) => index,
            Err(e) => return SourceReport::failed(SourceId::Radar, 1, &e),
        };

        let host = index
            .host
            .unwrap_or_else(|| DEFAULT_TILE_HOST.to_string());

        // Past frames first, then nowcast; the last usable one wins.
        let frame = index
            .radar
            .past
            .into_iter()
            .chain(index.radar.nowcast)
            .filter(|f| f.path.as_deref().is_some_and(|p| !p.is_empty()))
            .last()
            .map(|f| RadarFrame {
                host,
                path: f.path.unwrap_or_default(),
                time: f.time.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            });

        SourceReport::radar_frame(frame, SourceOutcome::success(1))
    }
}

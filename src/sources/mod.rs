//! Source adapters, one per hazard feed.
//!
//! Every adapter fetches its feed(s) through the shared
//! [`crate::fetch::FetchClient`], parses the payload, and yields canonical
//! [`crate::model::HazardEvent`]s plus a per-source outcome. Malformed
//! records are dropped individually; a total fetch failure produces zero
//! events and a populated outcome, never an abort of sibling sources.
//!
//! # Feeds
//!
//! - [`radar`]: radar mosaic frame index (reference record, no events)
//! - [`volcano`]: open volcanic-activity events
//! - [`alerts`]: government alert polygons
//! - [`severe`]: severe local-storm reports (tornado/wind/hail CSVs)
//! - [`seismic`]: two magnitude-threshold earthquake feeds
//! - [`wildfire`]: satellite wildfire detections
//! - [`cyclone`]: tropical-cyclone positions

pub mod alerts;
pub mod cyclone;
pub mod radar;
pub mod seismic;
pub mod severe;
pub mod volcano;
pub mod wildfire;

pub use alerts::AlertAdapter;
pub use cyclone::CycloneAdapter;
pub use radar::RadarAdapter;
pub use seismic::SeismicAdapter;
pub use severe::SevereReportAdapter;
pub use volcano::VolcanoAdapter;
pub use wildfire::WildfireAdapter;

use serde_json::Value;

use crate::coords::to_float;

/// Flatten a GeoJSON coordinate tree into (lon, lat) pairs. Any array
/// whose first two elements are numbers counts as one pair; everything
/// else recurses.
pub(crate) fn collect_lonlat(coords: &Value, out: &mut Vec<(f64, f64)>) {
    let Value::Array(items) = coords else {
        return;
    };
    if items.len() >= 2 && items[0].is_number() && items[1].is_number() {
        if let (Some(lon), Some(lat)) = (to_float(&items[0]), to_float(&items[1])) {
            out.push((lon, lat));
        }
        return;
    }
    for item in items {
        collect_lonlat(item, out);
    }
}

/// (min_lat, max_lat, min_lon, max_lon) over a vertex set, or `None` when
/// the set is empty.
pub(crate) fn vertex_bounds(vertices: &[(f64, f64)]) -> Option<(f64, f64, f64, f64)> {
    let mut iter = vertices.iter();
    let &(first_lon, first_lat) = iter.next()?;
    let mut bounds = (first_lat, first_lat, first_lon, first_lon);
    for &(lon, lat) in iter {
        bounds.0 = bounds.0.min(lat);
        bounds.1 = bounds.1.max(lat);
        bounds.2 = bounds.2.min(lon);
        bounds.3 = bounds.3.max(lon);
    }
    Some(bounds)
}

//! Snapshot assembly.
//!
//! The assembler is pure: it concatenates adapter outputs in a fixed
//! source-priority order, attaches the capture timestamp it is given, and
//! surfaces per-source stats in that same order. No filtering,
//! deduplication, or re-ordering happens here; completion order of the
//! fetches has no effect on the result.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{HazardEvent, RadarFrame, SourceId, SourceReport, SourceStats};

/// Fixed source ordering for assembled snapshots. Output is deterministic
/// across runs with identical inputs because of this, not because of any
/// property of the fetch layer.
pub const SOURCE_PRIORITY: [SourceId; 7] = [
    SourceId::Radar,
    SourceId::Volcanoes,
    SourceId::Alerts,
    SourceId::SevereReports,
    SourceId::Earthquakes,
    SourceId::Wildfires,
    SourceId::Cyclones,
];

/// One immutable poll-cycle result. Replaced, never mutated, by the next
/// cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// When this cycle's results were assembled.
    pub captured_at: DateTime<Utc>,

    /// Latest radar frame reference, when the index resolved one.
    pub radar: Option<RadarFrame>,

    /// All events, in fixed source-priority order.
    pub events: Vec<HazardEvent>,

    /// Per-source fetch statistics, in the same order.
    pub per_source_stats: Vec<SourceStats>,
}

/// Merge adapter reports into a snapshot. Reports may arrive in any
/// order; sources without a report are simply absent from the stats.
pub fn assemble(mut reports: Vec<SourceReport>, captured_at: DateTime<Utc>) -> Snapshot {
    let mut events = Vec::new();
    let mut per_source_stats = Vec::new();
    let mut radar = None;

    for source in SOURCE_PRIORITY {
        let Some(index) = reports.iter().position(|r| r.source == source) else {
            continue;
        };
        let report = reports.swap_remove(index);
        per_source_stats.push(SourceStats::new(source, report.outcome));
        if report.radar.is_some() {
            radar = report.radar;
        }
        events.extend(report.events);
    }

    Snapshot {
        captured_at,
        radar,
        events,
        per_source_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{HazardCategory, Position, SourceOutcome};

    fn event(category: HazardCategory, lat: f64) -> HazardEvent {
        HazardEvent::new(category, Position::new(lat, 10.0).unwrap())
    }

    fn reports_out_of_order() -> Vec<SourceReport> {
        vec![
            SourceReport::events(
                SourceId::Cyclones,
                vec![event(HazardCategory::Cyclone, 15.0)],
                SourceOutcome::success(1),
            ),
            SourceReport::events(
                SourceId::Earthquakes,
                vec![
                    event(HazardCategory::Seismic, 38.0),
                    event(HazardCategory::Seismic, 39.0),
                ],
                SourceOutcome::success(2),
            ),
            SourceReport::events(
                SourceId::Volcanoes,
                vec![event(HazardCategory::Volcano, 19.4)],
                SourceOutcome::success(1),
            ),
            SourceReport::events(
                SourceId::Wildfires,
                vec![event(HazardCategory::Wildfire, -15.0)],
                SourceOutcome::failure(1, ErrorKind::Parse),
            ),
        ]
    }

    #[test]
    fn test_events_follow_fixed_priority_not_completion_order() {
        let snapshot = assemble(reports_out_of_order(), Utc::now());

        let categories: Vec<HazardCategory> =
            snapshot.events.iter().map(|e| e.category).collect();
        assert_eq!(
            categories,
            vec![
                HazardCategory::Volcano,
                HazardCategory::Seismic,
                HazardCategory::Seismic,
                HazardCategory::Wildfire,
                HazardCategory::Cyclone,
            ]
        );

        let stat_sources: Vec<SourceId> =
            snapshot.per_source_stats.iter().map(|s| s.source).collect();
        assert_eq!(
            stat_sources,
            vec![
                SourceId::Volcanoes,
                SourceId::Earthquakes,
                SourceId::Wildfires,
                SourceId::Cyclones,
            ]
        );
    }

    #[test]
    fn test_assembly_is_idempotent_at_fixed_capture_time() {
        let captured_at = DateTime::parse_from_rfc3339("2026-08-07T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let first = assemble(reports_out_of_order(), captured_at);
        let mut shuffled = reports_out_of_order();
        shuffled.reverse();
        let second = assemble(shuffled, captured_at);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_all_sources_failed_still_yields_valid_snapshot() {
        let reports = SOURCE_PRIORITY
            .iter()
            .map(|&source| SourceReport {
                source,
                events: Vec::new(),
                radar: None,
                outcome: SourceOutcome::failure(1, ErrorKind::Network),
            })
            .collect();

        let snapshot = assemble(reports, Utc::now());

        assert!(snapshot.events.is_empty());
        assert_eq!(snapshot.per_source_stats.len(), 7);
        assert!(
            snapshot
                .per_source_stats
                .iter()
                .all(|s| s.error == Some(ErrorKind::Network))
        );
    }

    #[test]
    fn test_radar_frame_carried_through() {
        let reports = vec![SourceReport::radar_frame(
            Some(RadarFrame {
                host: "https://tiles.test".to_string(),
                path: "/v2/latest".to_string(),
                time: None,
            }),
            SourceOutcome::success(1),
        )];

        let snapshot = assemble(reports, Utc::now());

        assert_eq!(snapshot.radar.unwrap().path, "/v2/latest");
    }
}

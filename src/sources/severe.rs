//! Severe local-storm report adapter.
//!
//! Three delimited-text feeds (tornado, wind, hail), each with a same-day
//! URL and a previous-day fallback to cover the UTC day rollover. All six
//! sub-fetches run concurrently against the bounded fetch pool and their
//! rows are merged. Rows need a minimum column count; the trailing two
//! columns are the coordinate pair.

use chrono::{Duration, Utc};

use crate::config::PollConfig;
use crate::error::ErrorKind;
use crate::estimate::{HAIL_REPORT_RADIUS_M, TORNADO_REPORT_RADIUS_M, WIND_REPORT_RADIUS_M};
use crate::fetch::FetchClient;
use crate::model::{HazardCategory, HazardEvent, Position, SourceId, SourceOutcome, SourceReport};

/// Rows shorter than this are malformed and skipped.
const MIN_COLUMNS: usize = 8;

/// Severe-report subtypes, each with its own feed and fixed footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Tornado,
    Wind,
    Hail,
}

impl ReportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Tornado => "tornado",
            ReportKind::Wind => "wind",
            ReportKind::Hail => "hail",
        }
    }

    pub fn radius_m(&self) -> f64 {
        match self {
            ReportKind::Tornado => TORNADO_REPORT_RADIUS_M,
            ReportKind::Wind => WIND_REPORT_RADIUS_M,
            ReportKind::Hail => HAIL_REPORT_RADIUS_M,
        }
    }

    fn feed_slug(&self) -> &'static str {
        match self {
            ReportKind::Tornado => "torn",
            ReportKind::Wind => "wind",
            ReportKind::Hail => "hail",
        }
    }
}

/// Adapter for the severe-report feeds.
#[derive(Debug, Clone)]
pub struct SevereReportAdapter {
    base_url: String,
}

impl SevereReportAdapter {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            base_url: config.feeds.severe_reports.clone(),
        }
    }

    /// Same-day feed plus the previous UTC day's archive.
    fn feed_urls(&self, kind: ReportKind) -> [String; 2] {
        let yesterday = (Utc::now() - Duration::days(1)).format("%y%m%d");
        [
            format!("{}/today_{}.csv", self.base_url, kind.feed_slug()),
            format!("{}/{}_rpts_{}.csv", self.base_url, yesterday, kind.feed_slug()),
        ]
    }

    pub async fn collect(&self, client: &FetchClient) -> SourceReport {
        let (tornado, wind, hail) = tokio::join!(
            self.collect_kind(client, ReportKind::Tornado),
            self.collect_kind(client, ReportKind::Wind),
            self.collect_kind(client, ReportKind::Hail),
        );

        let mut events = Vec::new();
        let mut succeeded = 0;
        let mut error = None;
        for (kind_events, kind_succeeded, kind_error) in [tornado, wind, hail] {
            events.extend(kind_events);
            succeeded += kind_succeeded;
            if error.is_none() {
                error = kind_error;
            }
        }

        SourceReport::events(
            SourceId::SevereReports,
            events,
            SourceOutcome {
                attempted: 6,
                succeeded,
                error,
            },
        )
    }

    async fn collect_kind(
        &self,
        client: &FetchClient,
        kind: ReportKind,
    ) -> (Vec<HazardEvent>, u32, Option<ErrorKind>) {
        let [today, yesterday] = self.feed_urls(kind);
        let (a, b) = tokio::join!(client.get_text(&today), client.get_text(&yesterday));

        let mut events = Vec::new();
        let mut succeeded = 0;
        let mut error = None;
        for result in [a, b] {
            match result {
                Ok(text) => {
                    succeeded += 1;
                    events.extend(parse_report_rows(kind, &text));
                }
                Err(e) => {
                    if error.is_none() {
                        error = Some(e.kind());
                    }
                }
            }
        }
        (events, succeeded, error)
    }
}

fn parse_report_rows(kind: ReportKind, text: &str) -> Vec<HazardEvent> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut events = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        if record.len() < MIN_COLUMNS {
            continue;
        }
        let Some(lat) = parse_column(&record, record.len() - 2) else {
            continue;
        };
        let Some(lon) = parse_column(&record, record.len() - 1) else {
            continue;
        };
        let Ok(position) = Position::new(lat, lon) else {
            continue;
        };
        events.push(
            HazardEvent::new(HazardCategory::SevereReport, position)
                .with_radius_m(kind.radius_m())
                .with_attribute("report", kind.label()),
        );
    }
    events
}

fn parse_column(record: &csv::StringRecord, index: usize) -> Option<f64> {
    record.get(index)?.trim().parse().ok()
}

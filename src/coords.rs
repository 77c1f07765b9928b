//! Coordinate parsing for the heterogeneous encodings the feeds use.
//!
//! Feeds disagree on how they spell a position: plain JSON numbers, numeric
//! strings, or hemisphere-suffixed strings such as `"14.8N"` / `"55.2W"`.
//! Everything funnels through here and comes out as signed decimal degrees.
//!
//! The parser itself does not range-check; `"91N"` parses to `91.0`. Range
//! enforcement happens in [`crate::model::Position::new`] so that adapters
//! can drop the owning record rather than fail the whole source.

use serde_json::Value;

use crate::error::FetchError;

/// Lenient numeric coercion: JSON numbers pass through, numeric strings are
/// parsed, everything else is `None`.
pub fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a latitude value. A trailing `N` keeps the sign, a trailing `S`
/// negates it.
pub fn parse_latitude(value: &Value) -> Result<f64, FetchError> {
    parse_coordinate(value, 'N', 'S', "latitude")
}

/// Parse a longitude value. A trailing `E` keeps the sign, a trailing `W`
/// negates it.
pub fn parse_longitude(value: &Value) -> Result<f64, FetchError> {
    parse_coordinate(value, 'E', 'W', "longitude")
}

fn parse_coordinate(
    value: &Value,
    positive: char,
    negative: char,
    axis: &str,
) -> Result<f64, FetchError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| FetchError::Geometry(format!("non-finite {axis}: {n}"))),
        Value::String(s) => parse_suffixed(s, positive, negative)
            .ok_or_else(|| FetchError::Geometry(format!("unparseable {axis}: {s:?}"))),
        _ => Err(FetchError::Geometry(format!("missing {axis}"))),
    }
}

fn parse_suffixed(raw: &str, positive: char, negative: char) -> Option<f64> {
    let trimmed = raw.trim().to_ascii_uppercase();
    if trimmed.is_empty() {
        return None;
    }
    let (rest, sign) = if let Some(rest) = trimmed.strip_suffix(positive) {
        (rest, 1.0)
    } else if let Some(rest) = trimmed.strip_suffix(negative) {
        (rest, -1.0)
    } else {
        (trimmed.as_str(), 1.0)
    };
    rest.trim().parse::<f64>().ok().map(|v| sign * v)
}

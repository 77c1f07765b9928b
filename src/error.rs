//! Error types shared by the fetch client and the source adapters.
//!
//! Errors are split along the propagation policy: record-level failures
//! (`Parse`, `Geometry`) are absorbed by the adapter that hit them and only
//! cost the offending record, while source-level failures (`Network`,
//! `Http`) end up in that source's outcome without disturbing any other
//! source. Nothing here is fatal to a poll cycle.

use serde::{Deserialize, Serialize};

/// Failure raised while fetching or interpreting one feed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Timeout or connection-level failure. Not retried.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response that was not retryable, or retries exhausted.
    #[error("http status {status}")]
    Http { status: u16 },

    /// Malformed payload or a missing required field.
    #[error("parse error: {0}")]
    Parse(String),

    /// Unparseable or out-of-range coordinate.
    #[error("coordinate error: {0}")]
    Geometry(String),
}

impl FetchError {
    /// Collapse the error into the kind recorded in per-source stats.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network(_) => ErrorKind::Network,
            FetchError::Http { .. } => ErrorKind::Http,
            FetchError::Parse(_) => ErrorKind::Parse,
            FetchError::Geometry(_) => ErrorKind::Geometry,
        }
    }
}

/// Coarse error classification carried in a source's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Http,
    Parse,
    Geometry,
}

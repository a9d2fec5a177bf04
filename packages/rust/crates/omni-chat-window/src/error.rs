//! Error types for window ingestion and aggregator construction.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::WindowKind;

/// Failures reported synchronously to the caller of the aggregator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    /// `ingest` was called with no messages.
    #[error("invalid argument: ingest batch must not be empty")]
    EmptyBatch,

    /// A timestamp went backwards, either inside the batch or relative to the window.
    #[error("window invariant violation: timestamp {next} precedes {previous}")]
    WindowInvariantViolation {
        /// Newest timestamp seen before the offending message.
        previous: DateTime<Utc>,
        /// Timestamp of the offending message.
        next: DateTime<Utc>,
    },

    /// The configured window kind has no eviction semantics.
    #[error("unsupported window kind: {0}")]
    UnsupportedWindowKind(WindowKind),

    /// Window duration is zero or too large for timestamp arithmetic.
    #[error("invalid window duration: {0:?}")]
    InvalidDuration(std::time::Duration),
}

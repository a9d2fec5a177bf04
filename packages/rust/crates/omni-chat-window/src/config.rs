//! Aggregator configuration, fixed at construction.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the window decides which messages are live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Keep messages newer than `newest - window_duration`.
    #[default]
    Duration,
    /// Keep the last `window_size` messages. Declared only; rejected at construction.
    Count,
}

impl WindowKind {
    /// Stable lowercase label, as used in settings files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Duration => "duration",
            Self::Count => "count",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content normalization applied before counting.
#[derive(Clone, Default)]
pub enum Normalizer {
    /// Count content exactly as received.
    #[default]
    Identity,
    /// Strip leading and trailing whitespace.
    Trim,
    /// Lowercase (Unicode-aware).
    CaseFold,
    /// Trim, then lowercase.
    TrimCaseFold,
    /// Caller-supplied function.
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl Normalizer {
    /// Wrap an arbitrary normalization function.
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Parse a settings label (`identity`, `trim`, `casefold`, `trim_casefold`).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "identity" | "none" | "" => Some(Self::Identity),
            "trim" => Some(Self::Trim),
            "casefold" | "lowercase" => Some(Self::CaseFold),
            "trim_casefold" | "trim_lowercase" => Some(Self::TrimCaseFold),
            _ => None,
        }
    }

    /// Produce the counting key for `content`.
    #[must_use]
    pub fn apply(&self, content: &str) -> String {
        match self {
            Self::Identity => content.to_string(),
            Self::Trim => content.trim().to_string(),
            Self::CaseFold => content.to_lowercase(),
            Self::TrimCaseFold => content.trim().to_lowercase(),
            Self::Custom(f) => f(content),
        }
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Trim => f.write_str("Trim"),
            Self::CaseFold => f.write_str("CaseFold"),
            Self::TrimCaseFold => f.write_str("TrimCaseFold"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Immutable aggregator configuration.
#[derive(Clone, Debug)]
pub struct AggregatorConfig {
    /// Window policy. Only [`WindowKind::Duration`] is accepted.
    pub window_kind: WindowKind,
    /// Trailing window length.
    pub window_duration: Duration,
    /// Capacity for a count window. Unused while count windows are unsupported.
    pub window_size: usize,
    /// Applied to content before counting; reported contents are normalized.
    pub normalizer: Normalizer,
    /// Count each `(sender, content)` pair at most once within the window.
    pub unique: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            window_kind: WindowKind::Duration,
            window_duration: Duration::from_secs(60),
            window_size: 0,
            normalizer: Normalizer::Identity,
            unique: false,
        }
    }
}

impl AggregatorConfig {
    /// Duration window of the given length, defaults elsewhere.
    #[must_use]
    pub fn with_duration(window_duration: Duration) -> Self {
        Self {
            window_duration,
            ..Self::default()
        }
    }

    /// Replace the normalizer.
    #[must_use]
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Toggle one-vote-per-sender counting.
    #[must_use]
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }
}

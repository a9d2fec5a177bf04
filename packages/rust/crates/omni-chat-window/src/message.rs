//! Chat messages flowing into the window and the ranked counts flowing out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One chat message as delivered by a message source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct ChatMessage {
    /// Sender identifier (channel id, user name, ...).
    pub sender: String,
    /// Raw message text.
    pub content: String,
    /// Publication instant reported by the source.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a message from sender, content, and timestamp.
    pub fn new(
        sender: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            timestamp,
        }
    }
}

/// A distinct content and how many times it was counted in the window.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankedCount {
    /// Normalized message content.
    pub content: String,
    /// Occurrences in the current window (always at least 1).
    pub count: usize,
}

impl RankedCount {
    /// Build a ranked count.
    #[must_use]
    pub fn new(content: impl Into<String>, count: usize) -> Self {
        Self {
            content: content.into(),
            count,
        }
    }
}

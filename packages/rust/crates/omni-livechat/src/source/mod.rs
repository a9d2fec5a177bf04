//! Message sources: where batches of chat messages come from.

mod jsonl;
mod youtube;

use std::time::Duration;

use async_trait::async_trait;
use omni_chat_window::ChatMessage;
use thiserror::Error;

pub use jsonl::{JsonLinesSource, open_replay};
pub use youtube::{
    DEFAULT_YOUTUBE_API_BASE, LiveChatPage, YouTubeConfig, YouTubeLiveChatSource,
    parse_active_live_chat_id, parse_live_chat_page,
};

/// One poll's worth of messages.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    /// Newly arrived messages, possibly empty.
    pub messages: Vec<ChatMessage>,
    /// How long to wait before polling again.
    pub poll_after: Duration,
}

/// Failures while fetching or decoding chat messages.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport-level HTTP failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("api returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Response body was not the expected JSON.
    #[error("failed to decode api response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The video exists but is not streaming a live chat.
    #[error("no active live chat for video {0}")]
    NoActiveLiveChat(String),

    /// Reading replay input failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A feed of chat message batches.
#[async_trait]
pub trait MessageSource: Send {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Fetch the next batch. `Ok(None)` means the feed has ended.
    async fn next_batch(&mut self) -> Result<Option<SourceBatch>, SourceError>;
}

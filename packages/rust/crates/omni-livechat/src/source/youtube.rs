//! YouTube Data API v3 live chat poller.
//!
//! `liveChat/messages` is paged: each response carries `nextPageToken` and the
//! server-suggested `pollingIntervalMillis`, and the next request resumes from
//! that token.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use omni_chat_window::ChatMessage;
use reqwest::Client;
use serde::Deserialize;

use super::{MessageSource, SourceBatch, SourceError};

/// Public API root.
pub const DEFAULT_YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const LIVE_CHAT_PARTS: &str = "snippet,authorDetails";

/// Connection settings for [`YouTubeLiveChatSource`].
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// Data API key.
    pub api_key: String,
    /// API root without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Lower bound on the polling interval.
    pub min_poll_interval: Duration,
}

/// Decoded `liveChat/messages` page.
#[derive(Debug, Clone, Default)]
pub struct LiveChatPage {
    /// Text messages with valid timestamps, in response order.
    pub messages: Vec<ChatMessage>,
    /// Token for the next request.
    pub next_page_token: Option<String>,
    /// Server-suggested wait before the next request.
    pub polling_interval: Duration,
    /// Items dropped as non-text or with unparseable timestamps.
    pub skipped: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveChatMessageListResponse {
    #[serde(default)]
    items: Vec<LiveChatMessageItem>,
    next_page_token: Option<String>,
    #[serde(default)]
    polling_interval_millis: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveChatMessageItem {
    snippet: Option<Snippet>,
    author_details: Option<AuthorDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    published_at: Option<String>,
    text_message_details: Option<TextMessageDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextMessageDetails {
    message_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorDetails {
    #[serde(default)]
    channel_id: String,
}

#[derive(Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStreamingDetails {
    active_live_chat_id: Option<String>,
}

/// Decode a `liveChat/messages` response body.
///
/// Non-text items (super chats, membership events, ...), items with invalid
/// `publishedAt` values and items without an author channel id are skipped.
///
/// # Errors
///
/// [`SourceError::Decode`] when the body is not a message list.
pub fn parse_live_chat_page(raw: &str) -> Result<LiveChatPage, SourceError> {
    let response: LiveChatMessageListResponse = serde_json::from_str(raw)?;
    let mut page = LiveChatPage {
        messages: Vec::with_capacity(response.items.len()),
        next_page_token: response.next_page_token,
        polling_interval: Duration::from_millis(response.polling_interval_millis),
        skipped: 0,
    };
    for item in response.items {
        match item_to_message(item) {
            Some(message) => page.messages.push(message),
            None => page.skipped += 1,
        }
    }
    Ok(page)
}

fn item_to_message(item: LiveChatMessageItem) -> Option<ChatMessage> {
    let snippet = item.snippet?;
    let text = snippet.text_message_details?;
    let published_at = snippet.published_at.unwrap_or_default();
    let timestamp = match DateTime::parse_from_rfc3339(&published_at) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(error) => {
            tracing::warn!(
                event = "livechat.youtube.invalid_timestamp",
                published_at = %published_at,
                error = %error,
                "ignoring invalid timestamp"
            );
            return None;
        }
    };
    let Some(sender) = item
        .author_details
        .map(|author| author.channel_id)
        .filter(|channel_id| !channel_id.is_empty())
    else {
        tracing::warn!(
            event = "livechat.youtube.missing_author",
            "ignoring message without authorDetails.channelId"
        );
        return None;
    };
    Some(ChatMessage::new(sender, text.message_text, timestamp))
}

/// Decode a `videos?part=liveStreamingDetails` response into its active live chat id.
///
/// # Errors
///
/// [`SourceError::Decode`] for malformed bodies, [`SourceError::NoActiveLiveChat`]
/// when the video has no live chat.
pub fn parse_active_live_chat_id(raw: &str, video_id: &str) -> Result<String, SourceError> {
    let response: VideoListResponse = serde_json::from_str(raw)?;
    response
        .items
        .into_iter()
        .next()
        .and_then(|item| item.live_streaming_details)
        .and_then(|details| details.active_live_chat_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SourceError::NoActiveLiveChat(video_id.to_string()))
}

/// Polls one live chat, page by page.
pub struct YouTubeLiveChatSource {
    client: Client,
    config: YouTubeConfig,
    live_chat_id: String,
    page_token: Option<String>,
}

impl YouTubeLiveChatSource {
    /// Source for a known live chat id.
    ///
    /// # Errors
    ///
    /// [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: YouTubeConfig, live_chat_id: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            config: YouTubeConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            live_chat_id: live_chat_id.into(),
            page_token: None,
        })
    }

    /// Source for a video's active live chat, looked up via `videos.list`.
    ///
    /// # Errors
    ///
    /// HTTP, status, decode, or [`SourceError::NoActiveLiveChat`] failures.
    pub async fn for_video(config: YouTubeConfig, video_id: &str) -> Result<Self, SourceError> {
        let mut source = Self::new(config, String::new())?;
        let url = format!("{}/videos", source.config.base_url);
        let body = source
            .get_text(
                &url,
                &[
                    ("part", "liveStreamingDetails"),
                    ("id", video_id),
                    ("key", source.config.api_key.as_str()),
                ],
            )
            .await?;
        source.live_chat_id = parse_active_live_chat_id(&body, video_id)?;
        tracing::info!(
            event = "livechat.youtube.live_chat_resolved",
            video_id,
            live_chat_id = %source.live_chat_id,
            "resolved live chat id from video"
        );
        Ok(source)
    }

    /// Live chat being polled.
    #[must_use]
    pub fn live_chat_id(&self) -> &str {
        &self.live_chat_id
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, SourceError> {
        let started = Instant::now();
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                event = "livechat.youtube.non_success_status",
                status = %status,
                elapsed_ms = started.elapsed().as_millis(),
                "youtube api returned non-success status"
            );
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body = resp.text().await?;
        tracing::debug!(
            event = "livechat.youtube.request_completed",
            elapsed_ms = started.elapsed().as_millis(),
            bytes = body.len(),
            "youtube api request completed"
        );
        Ok(body)
    }
}

#[async_trait]
impl MessageSource for YouTubeLiveChatSource {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn next_batch(&mut self) -> Result<Option<SourceBatch>, SourceError> {
        let url = format!("{}/liveChat/messages", self.config.base_url);
        let mut query = vec![
            ("liveChatId", self.live_chat_id.as_str()),
            ("part", LIVE_CHAT_PARTS),
            ("key", self.config.api_key.as_str()),
        ];
        if let Some(token) = self.page_token.as_deref() {
            query.push(("pageToken", token));
        }
        let body = self.get_text(&url, &query).await?;
        let page = parse_live_chat_page(&body)?;

        tracing::debug!(
            event = "livechat.youtube.page",
            messages = page.messages.len(),
            skipped = page.skipped,
            polling_interval_ms = page.polling_interval.as_millis(),
            "live chat page received"
        );
        if page.next_page_token.is_some() {
            self.page_token = page.next_page_token;
        }
        Ok(Some(SourceBatch {
            messages: page.messages,
            poll_after: page.polling_interval.max(self.config.min_poll_interval),
        }))
    }
}

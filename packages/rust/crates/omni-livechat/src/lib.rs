//! omni-livechat: poll a live chat, count votes in a trailing window, render the leaders.
//!
//! ```text
//! MessageSource::next_batch ──► prepare_batch ──► LiveChatAggregator::ingest
//!                                                          │
//!                                 render_frame ◄── top_n ◄─┘
//! ```
//!
//! Settings come from `packages/conf/settings.yaml` merged with the user file; see
//! [`LiveChatSettings::load`].

mod config;
mod render;
mod runner;
mod source;

pub use config::{
    DEFAULT_REPLAY_BATCH_SIZE, DEFAULT_TOP, DEFAULT_WINDOW_SECS, DisplaySettings,
    LiveChatSettings, ReplaySettings, SettingsPaths, WindowOverrides, WindowSettings,
    YouTubeSettings, resolve_aggregator_config, resolve_replay_pacing, resolve_run_options,
    resolve_youtube_config,
};
pub use render::{CLEAR_SCREEN, render_frame};
pub use runner::{RunOptions, RunOutcome, prepare_batch, run_poll_loop};
pub use source::{
    DEFAULT_YOUTUBE_API_BASE, JsonLinesSource, LiveChatPage, MessageSource, SourceBatch,
    SourceError, YouTubeConfig, YouTubeLiveChatSource, open_replay, parse_active_live_chat_id,
    parse_live_chat_page,
};

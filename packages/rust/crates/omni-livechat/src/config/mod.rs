//! Settings files and their resolution against CLI flags.

mod resolve;
mod settings;

pub use resolve::{
    DEFAULT_REPLAY_BATCH_SIZE, DEFAULT_TOP, DEFAULT_WINDOW_SECS, WindowOverrides,
    resolve_aggregator_config, resolve_replay_pacing, resolve_run_options, resolve_youtube_config,
};
pub use settings::{
    DisplaySettings, LiveChatSettings, ReplaySettings, SettingsPaths, WindowSettings,
    YouTubeSettings,
};

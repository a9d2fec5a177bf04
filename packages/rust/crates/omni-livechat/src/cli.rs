use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use omni_livechat::WindowOverrides;

#[derive(Parser)]
#[command(name = "omni-livechat")]
#[command(about = "Count live-chat votes in a sliding window and show the most frequent messages.")]
pub(crate) struct Cli {
    /// Override config directory holding `omni-livechat/settings.yaml`.
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug logging (RUST_LOG still wins).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Options shared by every source.
#[derive(Args, Debug, Clone)]
pub(crate) struct WindowArgs {
    /// Sliding window duration in seconds (default: 60)
    #[arg(long)]
    pub(crate) window_seconds: Option<u64>,

    /// Number of messages to show (default: 10)
    #[arg(long)]
    pub(crate) top: Option<usize>,

    /// Count each sender at most once per message
    #[arg(long)]
    pub(crate) unique: bool,

    /// Content normalizer: identity, trim, casefold, trim_casefold
    #[arg(long)]
    pub(crate) normalizer: Option<String>,

    /// Do not clear the terminal between frames
    #[arg(long)]
    pub(crate) no_clear: bool,

    /// Stop after this many polls
    #[arg(long)]
    pub(crate) max_rounds: Option<u64>,
}

impl WindowArgs {
    pub(crate) fn overrides(&self) -> WindowOverrides {
        WindowOverrides {
            window_secs: self.window_seconds,
            unique: self.unique.then_some(true),
            normalizer: self.normalizer.clone(),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Poll a YouTube live chat through the Data API v3.
    Youtube {
        /// API key (or `youtube.api_key` in settings)
        #[arg(long)]
        api_key: Option<String>,

        /// Video ID; its active live chat is looked up
        #[arg(long, required_unless_present = "live_chat_id")]
        video_id: Option<String>,

        /// Live chat ID (skips the video lookup)
        #[arg(long)]
        live_chat_id: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Replay recorded messages from a JSON-lines file (`-` or omitted: stdin).
    Replay {
        /// Input file
        input: Option<PathBuf>,

        /// Messages per batch (default: 50)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Pause between batches in milliseconds (default: 0)
        #[arg(long)]
        interval_ms: Option<u64>,

        #[command(flatten)]
        window: WindowArgs,
    },
}

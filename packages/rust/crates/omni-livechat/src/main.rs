//! omni-livechat CLI: poll a live chat (YouTube or a JSON-lines replay) and render
//! the most frequent messages of the trailing window.
//!
//! Logging: set `RUST_LOG=omni_livechat=debug` (or `omni_chat_window=debug`) to see
//! per-batch logs on stderr.

mod cli;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use omni_chat_window::LiveChatAggregator;
use omni_livechat::{
    LiveChatSettings, MessageSource, RunOutcome, SettingsPaths, YouTubeLiveChatSource,
    open_replay, resolve_aggregator_config, resolve_replay_pacing, resolve_run_options,
    resolve_youtube_config, run_poll_loop,
};

use crate::cli::{Cli, Command, WindowArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "omni_livechat=debug,omni_chat_window=debug"
        } else {
            "omni_livechat=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let settings = LiveChatSettings::load(&SettingsPaths::discover(cli.conf.as_deref()));

    let outcome = match cli.command {
        Command::Youtube {
            api_key,
            video_id,
            live_chat_id,
            window,
        } => {
            let config = resolve_youtube_config(&settings.youtube, api_key)?;
            let mut source = match (live_chat_id, video_id) {
                (Some(live_chat_id), _) => YouTubeLiveChatSource::new(config, live_chat_id)?,
                (None, Some(video_id)) => {
                    tracing::info!(%video_id, "getting liveChatID from videoID");
                    YouTubeLiveChatSource::for_video(config, &video_id)
                        .await
                        .context("failed to resolve live chat id")?
                }
                (None, None) => anyhow::bail!("one of --video-id or --live-chat-id is required"),
            };
            run(&mut source, &window, &settings).await?
        }
        Command::Replay {
            input,
            batch_size,
            interval_ms,
            window,
        } => {
            let (batch_size, interval) =
                resolve_replay_pacing(&settings.replay, batch_size, interval_ms);
            let mut source = open_replay(input.as_deref(), batch_size, interval)
                .await
                .context("failed to open replay input")?;
            run(&mut source, &window, &settings).await?
        }
    };

    tracing::info!(
        rounds = outcome.rounds,
        ingested = outcome.ingested,
        dropped_late = outcome.dropped_late,
        interrupted = outcome.interrupted,
        "poll loop finished"
    );
    Ok(())
}

async fn run<S: MessageSource>(
    source: &mut S,
    window: &WindowArgs,
    settings: &LiveChatSettings,
) -> anyhow::Result<RunOutcome> {
    let config = resolve_aggregator_config(&settings.window, &window.overrides())?;
    let mut aggregator =
        LiveChatAggregator::new(config).context("invalid aggregator configuration")?;
    let options = resolve_run_options(
        &settings.display,
        window.top,
        window.no_clear,
        window.max_rounds,
    );
    let mut stdout = std::io::stdout().lock();
    run_poll_loop(source, &mut aggregator, &mut stdout, &options).await
}

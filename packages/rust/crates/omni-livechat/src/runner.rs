//! Poll loop: fetch a batch, ingest it, render the top contents, wait, repeat.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use omni_chat_window::{ChatMessage, LiveChatAggregator};

use crate::render::render_frame;
use crate::source::MessageSource;

/// Poll-loop options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Contents rendered per frame.
    pub top: usize,
    /// Clear the terminal before each frame.
    pub clear_screen: bool,
    /// Stop after this many polls.
    pub max_rounds: Option<u64>,
}

/// Totals reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Completed polls.
    pub rounds: u64,
    /// Messages handed to the aggregator.
    pub ingested: u64,
    /// Messages discarded for arriving behind the window's newest timestamp.
    pub dropped_late: u64,
    /// Stopped by Ctrl+C.
    pub interrupted: bool,
}

/// Order a polled batch for ingestion.
///
/// Sorts by timestamp (stable, so same-instant messages keep arrival order) and drops
/// messages older than `newest`, the window's newest timestamp. Returns the batch and
/// the number dropped.
#[must_use]
pub fn prepare_batch(
    mut messages: Vec<ChatMessage>,
    newest: Option<DateTime<Utc>>,
) -> (Vec<ChatMessage>, usize) {
    messages.sort_by_key(|message| message.timestamp);
    let Some(newest) = newest else {
        return (messages, 0);
    };
    let before = messages.len();
    messages.retain(|message| message.timestamp >= newest);
    let dropped = before - messages.len();
    (messages, dropped)
}

/// Drive `source` into `aggregator`, writing one frame per poll to `out`.
///
/// Stops when the source ends, `max_rounds` is reached, or Ctrl+C is received.
///
/// # Errors
///
/// Source failures, rejected batches, and write errors on `out`.
pub async fn run_poll_loop<S, W>(
    source: &mut S,
    aggregator: &mut LiveChatAggregator,
    out: &mut W,
    options: &RunOptions,
) -> Result<RunOutcome>
where
    S: MessageSource + ?Sized,
    W: Write,
{
    let mut outcome = RunOutcome::default();
    let source_name = source.name().to_string();

    loop {
        let reached_limit = options
            .max_rounds
            .is_some_and(|max_rounds| outcome.rounds >= max_rounds);
        if reached_limit || outcome.interrupted {
            break;
        }

        let batch = tokio::select! {
            batch = source.next_batch() => batch
                .with_context(|| format!("{source_name} source poll failed"))?,
            _ = tokio::signal::ctrl_c() => {
                outcome.interrupted = true;
                tracing::info!(rounds = outcome.rounds, "received Ctrl+C; stopping poll loop");
                break;
            }
        };
        let Some(batch) = batch else {
            tracing::info!(source = %source_name, rounds = outcome.rounds, "message source ended");
            break;
        };
        outcome.rounds += 1;

        let (messages, dropped) =
            prepare_batch(batch.messages, aggregator.window().newest_timestamp());
        if dropped > 0 {
            tracing::warn!(
                event = "livechat.runner.late_messages",
                dropped,
                "dropping messages older than the window's newest timestamp"
            );
            outcome.dropped_late += dropped as u64;
        }
        if !messages.is_empty() {
            let added = messages.len();
            let evicted = aggregator
                .ingest(messages)
                .context("aggregator rejected polled batch")?;
            outcome.ingested += added as u64;
            tracing::debug!(
                event = "livechat.runner.ingested",
                round = outcome.rounds,
                added,
                evicted,
                "batch ingested"
            );
        }

        let top = aggregator.top_n(options.top);
        let frame = render_frame(&top, &aggregator.stats(), options.clear_screen);
        out.write_all(frame.as_bytes())
            .and_then(|()| out.flush())
            .context("failed to write frame")?;

        let reached_limit = options
            .max_rounds
            .is_some_and(|max_rounds| outcome.rounds >= max_rounds);
        if reached_limit || batch.poll_after.is_zero() {
            continue;
        }
        tokio::select! {
            () = tokio::time::sleep(batch.poll_after) => {}
            _ = tokio::signal::ctrl_c() => {
                outcome.interrupted = true;
                tracing::info!(rounds = outcome.rounds, "received Ctrl+C; stopping poll loop");
            }
        }
    }

    Ok(outcome)
}

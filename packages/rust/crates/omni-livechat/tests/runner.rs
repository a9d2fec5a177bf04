#![allow(missing_docs)]

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use omni_chat_window::{AggregatorConfig, ChatMessage, LiveChatAggregator};
use omni_livechat::{
    CLEAR_SCREEN, MessageSource, RunOptions, SourceBatch, SourceError, run_poll_loop,
};

struct ScriptedSource {
    batches: VecDeque<Result<Vec<ChatMessage>, SourceError>>,
}

impl ScriptedSource {
    fn new(batches: Vec<Vec<ChatMessage>>) -> Self {
        Self {
            batches: batches.into_iter().map(Ok).collect(),
        }
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn next_batch(&mut self) -> Result<Option<SourceBatch>, SourceError> {
        match self.batches.pop_front() {
            Some(Ok(messages)) => Ok(Some(SourceBatch {
                messages,
                poll_after: Duration::ZERO,
            })),
            Some(Err(error)) => Err(error),
            None => Ok(None),
        }
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid base timestamp")
}

fn votes(content: &str, count: usize, at: DateTime<Utc>) -> Vec<ChatMessage> {
    (0..count)
        .map(|i| ChatMessage::new(format!("{content}fan{i}"), content, at))
        .collect()
}

fn aggregator() -> LiveChatAggregator {
    LiveChatAggregator::new(AggregatorConfig::with_duration(Duration::from_secs(300)))
        .expect("aggregator")
}

fn options(top: usize, max_rounds: Option<u64>) -> RunOptions {
    RunOptions {
        top,
        clear_screen: false,
        max_rounds,
    }
}

#[tokio::test]
async fn renders_one_frame_per_poll_until_source_ends() {
    let t1 = t0() + TimeDelta::minutes(3);
    let t2 = t1 + TimeDelta::minutes(3);
    let mut first = votes("grass", 2, t0());
    first.extend(votes("grass", 1, t1));
    first.extend(votes("water", 2, t1));
    first.extend(votes("fire", 1, t1));

    let mut source = ScriptedSource::new(vec![first, Vec::new(), votes("electric", 2, t2)]);
    let mut aggregator = aggregator();
    let mut out: Vec<u8> = Vec::new();

    let outcome = run_poll_loop(&mut source, &mut aggregator, &mut out, &options(4, None))
        .await
        .expect("poll loop");

    assert_eq!(outcome.rounds, 3);
    assert_eq!(outcome.ingested, 8);
    assert_eq!(outcome.dropped_late, 0);
    assert!(!outcome.interrupted);

    let text = String::from_utf8(out).expect("utf8");
    assert_eq!(text.matches("window_size=").count(), 3);
    assert!(text.starts_with("grass: 3\nwater: 2\nfire: 1\nwindow_size=6\n"));
    assert!(text.ends_with("water: 2\nelectric: 2\nfire: 1\ngrass: 1\nwindow_size=6\n"));
}

#[tokio::test]
async fn late_messages_are_dropped_not_fatal() {
    let t1 = t0() + TimeDelta::seconds(30);
    let mut second = votes("late", 1, t0());
    second.extend(votes("fresh", 1, t1));

    let mut source = ScriptedSource::new(vec![votes("first", 1, t1), second]);
    let mut aggregator = aggregator();
    let mut out: Vec<u8> = Vec::new();

    let outcome = run_poll_loop(&mut source, &mut aggregator, &mut out, &options(10, None))
        .await
        .expect("poll loop");

    assert_eq!(outcome.dropped_late, 1);
    assert_eq!(outcome.ingested, 2);
    assert_eq!(aggregator.stats().retained, 2);
}

#[tokio::test]
async fn max_rounds_stops_early() {
    let mut source = ScriptedSource::new(vec![
        votes("a", 1, t0()),
        votes("b", 1, t0()),
        votes("c", 1, t0()),
    ]);
    let mut aggregator = aggregator();
    let mut out: Vec<u8> = Vec::new();
    let opts = RunOptions {
        clear_screen: true,
        ..options(1, Some(2))
    };

    let outcome = run_poll_loop(&mut source, &mut aggregator, &mut out, &opts)
        .await
        .expect("poll loop");

    assert_eq!(outcome.rounds, 2);
    let text = String::from_utf8(out).expect("utf8");
    assert_eq!(text.matches(CLEAR_SCREEN).count(), 2);
    assert_eq!(source.batches.len(), 1);
}

#[tokio::test]
async fn source_errors_propagate() {
    let mut source = ScriptedSource {
        batches: VecDeque::from([Err(SourceError::NoActiveLiveChat("v".to_string()))]),
    };
    let mut aggregator = aggregator();
    let mut out: Vec<u8> = Vec::new();

    let err = run_poll_loop(&mut source, &mut aggregator, &mut out, &options(1, None))
        .await
        .expect_err("source failure");
    assert!(err.to_string().contains("scripted source poll failed"));
}

//! Window store: arrival-ordered buffer of messages inside the trailing time window.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{AggregatorError, ChatMessage};

/// Counters for diagnostics and the presentation footer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Messages currently in the window.
    pub retained: usize,
    /// Messages accepted since creation.
    pub total_ingested: u64,
    /// Messages dropped by eviction since creation.
    pub total_evicted: u64,
}

/// Trailing time window over ingested messages.
///
/// Batches must arrive in non-decreasing timestamp order, both within a batch and
/// relative to what is already stored. That keeps the buffer sorted, so eviction is a
/// binary search plus a prefix drain: O(log W + k) per ingest.
#[derive(Debug)]
pub struct WindowStore {
    ring: VecDeque<ChatMessage>,
    window: TimeDelta,
    window_duration: Duration,
    total_ingested: u64,
    total_evicted: u64,
}

impl WindowStore {
    /// Create an empty store keeping messages newer than `newest - window_duration`.
    ///
    /// # Errors
    ///
    /// [`AggregatorError::InvalidDuration`] when the duration is zero or out of range.
    pub fn new(window_duration: Duration) -> Result<Self, AggregatorError> {
        if window_duration.is_zero() {
            return Err(AggregatorError::InvalidDuration(window_duration));
        }
        let window = TimeDelta::from_std(window_duration)
            .map_err(|_| AggregatorError::InvalidDuration(window_duration))?;
        Ok(Self {
            ring: VecDeque::new(),
            window,
            window_duration,
            total_ingested: 0,
            total_evicted: 0,
        })
    }

    /// Append a batch and evict everything at or before `batch.last - window`.
    ///
    /// Returns the number of evicted messages. On error the window is unchanged.
    ///
    /// # Errors
    ///
    /// - [`AggregatorError::EmptyBatch`] for an empty batch.
    /// - [`AggregatorError::WindowInvariantViolation`] when a timestamp goes backwards.
    pub fn ingest(&mut self, batch: Vec<ChatMessage>) -> Result<usize, AggregatorError> {
        let Some(newest) = batch.last().map(|message| message.timestamp) else {
            return Err(AggregatorError::EmptyBatch);
        };
        check_order(self.newest_timestamp(), &batch)?;

        let added = batch.len();
        self.ring.extend(batch);
        self.total_ingested += added as u64;

        let evicted = match newest.checked_sub_signed(self.window) {
            Some(cutoff) => {
                let keep_from = self.ring.partition_point(|message| message.timestamp <= cutoff);
                self.ring.drain(..keep_from);
                keep_from
            }
            None => 0,
        };
        self.total_evicted += evicted as u64;

        tracing::debug!(
            event = "chat_window.ingest",
            added,
            evicted,
            retained = self.ring.len(),
            newest = %newest,
            "window batch ingested"
        );
        Ok(evicted)
    }

    /// Timestamp of the most recently ingested message, if any.
    #[must_use]
    pub fn newest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.ring.back().map(|message| message.timestamp)
    }

    /// Messages in the window, oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.ring.iter()
    }

    /// Number of messages in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the window holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Configured window length.
    #[must_use]
    pub fn window_duration(&self) -> Duration {
        self.window_duration
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> WindowStats {
        WindowStats {
            retained: self.ring.len(),
            total_ingested: self.total_ingested,
            total_evicted: self.total_evicted,
        }
    }
}

fn check_order(
    mut previous: Option<DateTime<Utc>>,
    batch: &[ChatMessage],
) -> Result<(), AggregatorError> {
    for message in batch {
        if let Some(prev) = previous
            && message.timestamp < prev
        {
            return Err(AggregatorError::WindowInvariantViolation {
                previous: prev,
                next: message.timestamp,
            });
        }
        previous = Some(message.timestamp);
    }
    Ok(())
}

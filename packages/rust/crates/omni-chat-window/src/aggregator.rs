//! Aggregator: one config, one window store, ranked queries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    AggregatorConfig, AggregatorError, ChatMessage, RankedCount, Ranker, WindowKind, WindowStats,
    WindowStore,
};

/// Windowed frequency aggregator for a single polling session.
#[derive(Debug)]
pub struct LiveChatAggregator {
    config: AggregatorConfig,
    window: WindowStore,
}

impl LiveChatAggregator {
    /// Build an aggregator from an immutable config.
    ///
    /// # Errors
    ///
    /// - [`AggregatorError::UnsupportedWindowKind`] for [`WindowKind::Count`].
    /// - [`AggregatorError::InvalidDuration`] for a zero or out-of-range duration.
    pub fn new(config: AggregatorConfig) -> Result<Self, AggregatorError> {
        if config.window_kind != WindowKind::Duration {
            return Err(AggregatorError::UnsupportedWindowKind(config.window_kind));
        }
        let window = WindowStore::new(config.window_duration)?;
        tracing::debug!(
            event = "chat_window.aggregator.created",
            window_secs = config.window_duration.as_secs_f64(),
            normalizer = ?config.normalizer,
            unique = config.unique,
            "live chat aggregator created"
        );
        Ok(Self { config, window })
    }

    /// Append a batch to the window and evict expired messages.
    ///
    /// # Errors
    ///
    /// See [`WindowStore::ingest`].
    pub fn ingest(&mut self, batch: Vec<ChatMessage>) -> Result<usize, AggregatorError> {
        self.window.ingest(batch)
    }

    /// The `n` most frequent contents currently in the window.
    #[must_use]
    pub fn top_n(&self, n: usize) -> Vec<RankedCount> {
        Ranker::from_config(&self.config).top_n(self.window.iter(), n)
    }

    /// Configuration fixed at construction.
    #[must_use]
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Read access to the underlying window.
    #[must_use]
    pub fn window(&self) -> &WindowStore {
        &self.window
    }

    /// Window counters.
    #[must_use]
    pub fn stats(&self) -> WindowStats {
        self.window.stats()
    }
}

/// Thread-safe handle: one mutex held for the whole of each ingest and query.
#[derive(Clone, Debug)]
pub struct SharedAggregator {
    inner: Arc<Mutex<LiveChatAggregator>>,
}

impl SharedAggregator {
    /// Wrap an aggregator for shared use.
    #[must_use]
    pub fn new(aggregator: LiveChatAggregator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(aggregator)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LiveChatAggregator> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locked [`LiveChatAggregator::ingest`].
    ///
    /// # Errors
    ///
    /// See [`WindowStore::ingest`].
    pub fn ingest(&self, batch: Vec<ChatMessage>) -> Result<usize, AggregatorError> {
        self.lock().ingest(batch)
    }

    /// Locked [`LiveChatAggregator::top_n`].
    #[must_use]
    pub fn top_n(&self, n: usize) -> Vec<RankedCount> {
        self.lock().top_n(n)
    }

    /// Locked [`LiveChatAggregator::stats`].
    #[must_use]
    pub fn stats(&self) -> WindowStats {
        self.lock().stats()
    }

    /// Newest timestamp in the window.
    #[must_use]
    pub fn newest_timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.lock().window().newest_timestamp()
    }
}

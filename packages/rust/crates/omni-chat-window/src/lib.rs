//! omni-chat-window: trailing time window over live-chat messages.
//!
//! Ingests timestamped message batches, evicts what falls out of the window, and
//! answers exact top-N content counts on demand.
//!
//! ```text
//! source batch ──► WindowStore::ingest (append, evict prefix)
//!                        │
//!                        ▼
//!                  Ranker::top_n (recount, bounded heap) ──► [RankedCount]
//! ```

mod aggregator;
mod config;
mod error;
mod message;
mod ranker;
mod window;

pub use aggregator::{LiveChatAggregator, SharedAggregator};
pub use config::{AggregatorConfig, Normalizer, WindowKind};
pub use error::AggregatorError;
pub use message::{ChatMessage, RankedCount};
pub use ranker::Ranker;
pub use window::{WindowStats, WindowStore};

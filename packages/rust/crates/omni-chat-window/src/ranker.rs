//! Top-N ranking over a set of messages.
//!
//! Each query recounts from scratch into a local map, then keeps the best `n`
//! candidates in a bounded min-heap (O(D log n) for D distinct contents).
//!
//! Order: count descending, then earliest timestamp of the content ascending, then
//! content ascending. The order is total, so `top_n(k)` is a prefix of `top_n(k + 1)`.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::{AggregatorConfig, ChatMessage, Normalizer, RankedCount};

/// Counting policy borrowed from an [`AggregatorConfig`].
#[derive(Clone, Copy, Debug)]
pub struct Ranker<'a> {
    normalizer: &'a Normalizer,
    unique: bool,
}

struct Tally {
    count: usize,
    first_seen: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq)]
struct Candidate {
    count: usize,
    first_seen: DateTime<Utc>,
    content: String,
}

// Greater means ranked higher.
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.first_seen.cmp(&self.first_seen))
            .then_with(|| other.content.cmp(&self.content))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a> Ranker<'a> {
    /// Ranker with an explicit normalizer and uniqueness flag.
    #[must_use]
    pub fn new(normalizer: &'a Normalizer, unique: bool) -> Self {
        Self { normalizer, unique }
    }

    /// Ranker using the counting options of `config`.
    #[must_use]
    pub fn from_config(config: &'a AggregatorConfig) -> Self {
        Self::new(&config.normalizer, config.unique)
    }

    /// The `n` most frequent contents among `messages`, best first.
    ///
    /// Returns fewer than `n` entries when there are fewer distinct contents.
    pub fn top_n<'m>(
        &self,
        messages: impl IntoIterator<Item = &'m ChatMessage>,
        n: usize,
    ) -> Vec<RankedCount> {
        if n == 0 {
            return Vec::new();
        }
        let tallies = self.count(messages);

        let mut heap = BinaryHeap::with_capacity(n.min(tallies.len()) + 1);
        for (content, tally) in tallies {
            heap.push(Reverse(Candidate {
                count: tally.count,
                first_seen: tally.first_seen,
                content,
            }));
            if heap.len() > n {
                heap.pop();
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|Reverse(candidate)| RankedCount::new(candidate.content, candidate.count))
            .collect()
    }

    fn count<'m>(
        &self,
        messages: impl IntoIterator<Item = &'m ChatMessage>,
    ) -> HashMap<String, Tally> {
        let mut tallies: HashMap<String, Tally> = HashMap::new();
        let mut votes: HashSet<(&'m str, String)> = HashSet::new();
        for message in messages {
            let key = self.normalizer.apply(&message.content);
            if self.unique && !votes.insert((message.sender.as_str(), key.clone())) {
                continue;
            }
            tallies
                .entry(key)
                .and_modify(|tally| {
                    tally.count += 1;
                    tally.first_seen = tally.first_seen.min(message.timestamp);
                })
                .or_insert(Tally {
                    count: 1,
                    first_seen: message.timestamp,
                });
        }
        tallies
    }
}

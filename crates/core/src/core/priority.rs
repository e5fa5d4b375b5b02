//! Priority queue for BPE merge candidates.
//!
//! A max-heap of pair counts with lazy invalidation: updating a pair pushes
//! a fresh entry, and entries whose count no longer matches the current
//! count are discarded when they surface.

use crate::core::merges::Pair;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;

/// A merge candidate during BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbol IDs to merge
    pub pair: Pair,
    /// The weighted frequency of this pair
    pub count: u64,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64) -> Self {
        Self { pair, count }
    }
}

// Ordered by count only at the top level; equal counts fall back to the
// pair so the heap is a total order. Callers that care about ties use
// `pop_ties`.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge operations.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
#[derive(Default)]
pub struct PairPriorityQueue {
    /// The heap storing merge candidates
    heap: OctonaryHeap<MergeCandidate>,
    /// Current count per live pair; anything else in the heap is stale
    current_counts: AHashMap<Pair, u64>,
}

impl PairPriorityQueue {
    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            current_counts: AHashMap::with_capacity(capacity),
        }
    }

    /// Push a merge candidate onto the queue.
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.update(candidate.pair, candidate.count);
    }

    /// Set the count for a pair.
    ///
    /// Any older entry for the pair becomes stale. A count of zero removes
    /// the pair.
    pub fn update(&mut self, pair: Pair, new_count: u64) {
        if new_count == 0 {
            self.current_counts.remove(&pair);
            return;
        }
        if self.current_counts.insert(pair, new_count) == Some(new_count) {
            return;
        }
        self.heap.push(MergeCandidate::new(pair, new_count));
    }

    /// Pop the highest priority merge candidate.
    ///
    /// Returns None if the queue is empty or only contains stale entries.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.current_counts.get(&candidate.pair) == Some(&candidate.count) {
                self.current_counts.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Pop every live candidate sharing the highest count.
    ///
    /// Returns an empty vector when the queue holds no live entries.
    pub fn pop_ties(&mut self) -> Vec<MergeCandidate> {
        let mut ties = Vec::new();
        let Some(first) = self.pop() else {
            return ties;
        };
        let top = first.count;
        ties.push(first);

        while self.peek_live().is_some_and(|c| c.count == top) {
            if let Some(next) = self.pop() {
                ties.push(next);
            }
        }
        ties
    }

    /// Peek at the highest live candidate, dropping stale entries on the way.
    fn peek_live(&mut self) -> Option<&MergeCandidate> {
        loop {
            let stale = match self.heap.peek() {
                None => return None,
                Some(top) => self.current_counts.get(&top.pair) != Some(&top.count),
            };
            if !stale {
                return self.heap.peek();
            }
            self.heap.pop();
        }
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue has no live pairs.
    pub fn is_empty(&self) -> bool {
        self.current_counts.is_empty()
    }

    /// Clear all entries from the queue.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.current_counts.clear();
    }

    /// Get the current count for a pair.
    pub fn get_count(&self, pair: Pair) -> Option<u64> {
        self.current_counts.get(&pair).copied()
    }
}

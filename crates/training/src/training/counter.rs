//! Pair counting for BPE training.
//!
//! The counter owns the frequency table and the current split of every
//! distinct word. Words are kept in first-seen order; that order, with
//! positions read left to right, is the canonical traversal used to break
//! ties between equally frequent pairs.

use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;
use subtok_core::{merge_pair, Pair, Vocabulary, WordSplitter};

/// Where a pair first occurs: (word index, position within the split).
pub type Position = (u32, u32);

/// Aggregate statistics for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairStat {
    /// Occurrences weighted by word frequency
    pub count: u64,
    /// First occurrence in the canonical traversal
    pub first: Position,
}

impl PairStat {
    fn absorb(&mut self, other: PairStat) {
        self.count += other.count;
        self.first = self.first.min(other.first);
    }
}

/// Pair -> aggregate statistics.
pub type PairStats = AHashMap<Pair, PairStat>;

/// Counter for BPE pair frequencies.
#[derive(Debug, Default)]
pub struct PairCounter {
    /// Word -> index into the parallel vectors below
    word_index: AHashMap<CompactString, usize>,
    /// Distinct words in first-seen order
    words: Vec<CompactString>,
    /// Current split of each word, as symbol IDs
    splits: Vec<Vec<u32>>,
    /// Corpus frequency of each word
    word_counts: Vec<u64>,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every word of `text`.
    pub fn add_text(&mut self, text: &str, splitter: &WordSplitter, vocab: &mut Vocabulary) {
        splitter.for_each_word(text, |word| self.add_word(word, vocab));
    }

    /// Add one occurrence of a normalized word.
    ///
    /// A first-seen word registers its character split and adds its
    /// characters to the vocabulary.
    pub fn add_word(&mut self, word: &str, vocab: &mut Vocabulary) {
        if let Some(&idx) = self.word_index.get(word) {
            self.word_counts[idx] += 1;
            return;
        }

        let mut buf = [0u8; 4];
        let split: Vec<u32> = word
            .chars()
            .map(|c| vocab.add_token(c.encode_utf8(&mut buf)))
            .collect();

        let word = CompactString::new(word);
        self.word_index.insert(word.clone(), self.words.len());
        self.words.push(word);
        self.splits.push(split);
        self.word_counts.push(1);
    }

    /// Count all pairs sequentially.
    pub fn count_pairs_sequential(&self) -> PairStats {
        let mut stats = PairStats::new();
        for (idx, (split, &count)) in self.splits.iter().zip(&self.word_counts).enumerate() {
            Self::count_word(&mut stats, idx as u32, split, count);
        }
        stats
    }

    /// Count all pairs in parallel.
    ///
    /// Counts are summed and first occurrences take the minimum, so the
    /// result equals [`count_pairs_sequential`](Self::count_pairs_sequential)
    /// for any number of workers.
    pub fn count_pairs_parallel(&self) -> PairStats {
        use rayon::prelude::*;

        self.splits
            .par_iter()
            .zip(self.word_counts.par_iter())
            .enumerate()
            .fold(PairStats::new, |mut stats, (idx, (split, &count))| {
                Self::count_word(&mut stats, idx as u32, split, count);
                stats
            })
            .reduce(PairStats::new, |mut acc, stats| {
                for (pair, stat) in stats {
                    acc.entry(pair)
                        .and_modify(|s| s.absorb(stat))
                        .or_insert(stat);
                }
                acc
            })
    }

    fn count_word(stats: &mut PairStats, idx: u32, split: &[u32], count: u64) {
        for (pos, window) in split.windows(2).enumerate() {
            let pair = (window[0], window[1]);
            let stat = PairStat {
                count,
                first: (idx, pos as u32),
            };
            stats
                .entry(pair)
                .and_modify(|s| s.absorb(stat))
                .or_insert(stat);
        }
    }

    /// Pick the most frequent pair; ties go to the earliest first occurrence.
    pub fn select_best(stats: &PairStats) -> Option<(Pair, u64)> {
        stats
            .iter()
            .max_by(|(_, a), (_, b)| a.count.cmp(&b.count).then(b.first.cmp(&a.first)))
            .map(|(&pair, stat)| (pair, stat.count))
    }

    /// Among `candidates`, the pair that occurs first in the canonical
    /// traversal.
    pub fn first_occurrence(&self, candidates: &AHashSet<Pair>) -> Option<Pair> {
        self.splits.iter().find_map(|split| {
            split
                .windows(2)
                .map(|w| (w[0], w[1]))
                .find(|pair| candidates.contains(pair))
        })
    }

    /// Fuse `pair` into `new_token_id` in every split.
    ///
    /// Returns the resulting change in weighted pair counts. Only words that
    /// contained the pair contribute.
    pub fn merge_pair_in_words(&mut self, pair: Pair, new_token_id: u32) -> AHashMap<Pair, i64> {
        let mut deltas: AHashMap<Pair, i64> = AHashMap::new();

        for (split, &count) in self.splits.iter_mut().zip(&self.word_counts) {
            if !split.windows(2).any(|w| (w[0], w[1]) == pair) {
                continue;
            }

            let weight = count as i64;
            for w in split.windows(2) {
                *deltas.entry((w[0], w[1])).or_insert(0) -= weight;
            }
            merge_pair(split, &pair.0, &pair.1, &new_token_id);
            for w in split.windows(2) {
                *deltas.entry((w[0], w[1])).or_insert(0) += weight;
            }
        }

        deltas.retain(|_, delta| *delta != 0);
        deltas
    }

    /// Get the number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total count of all word occurrences.
    pub fn total_word_occurrences(&self) -> u64 {
        self.word_counts.iter().sum()
    }

    /// Distinct words in first-seen order.
    pub fn words(&self) -> &[CompactString] {
        &self.words
    }

    /// Current splits, parallel to [`words`](Self::words).
    pub fn splits(&self) -> &[Vec<u32>] {
        &self.splits
    }

    /// Frequency of a word, if seen.
    pub fn frequency(&self, word: &str) -> Option<u64> {
        self.word_index.get(word).map(|&i| self.word_counts[i])
    }

    /// Current split of a word, if seen.
    pub fn split_of(&self, word: &str) -> Option<&[u32]> {
        self.word_index.get(word).map(|&i| self.splits[i].as_slice())
    }

    /// Clear all data from the counter.
    pub fn clear(&mut self) {
        self.word_index.clear();
        self.words.clear();
        self.splits.clear();
        self.word_counts.clear();
    }
}

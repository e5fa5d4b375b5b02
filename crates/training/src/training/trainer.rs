//! BPE trainer implementation.
//!
//! The trainer owns all corpus-wide state for one run: word frequencies,
//! current splits, the vocabulary and the rule accumulator. It is a small
//! state machine that stays in [`TrainerState::Training`] until the
//! vocabulary reaches its target size or no pair is left to merge.
//!
//! Merge selection always picks the highest weighted pair count. Ties go to
//! the pair that occurs first when words are walked in first-seen order and
//! each split is read left to right. Both selection strategies follow this
//! rule, so they produce identical rule sets.

use super::counter::PairCounter;
use ahash::{AHashMap, AHashSet};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use subtok_core::{
    BpeError, MergeCandidate, MergeRule, Pair, PairPriorityQueue, Result, RuleSet, Vocabulary,
    WordSplitter,
};

/// How the best pair is found each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// Recount every pair from scratch on each iteration
    Recount,
    /// Keep counts in a lazily-invalidated heap, updated from merge deltas
    #[default]
    Incremental,
}

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Target vocabulary size
    pub vocab_size: usize,
    /// Symbols present in the vocabulary before preprocessing
    pub seed_alphabet: Vec<String>,
    /// Minimum weighted count for a pair to be merged
    pub min_frequency: u64,
    /// Pair selection strategy
    pub strategy: SelectionStrategy,
    /// Whether recounts run on the rayon pool
    pub parallel: bool,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 700,
            seed_alphabet: Vec::new(),
            min_frequency: 1,
            strategy: SelectionStrategy::default(),
            parallel: false,
            show_progress: false,
        }
    }
}

impl TrainingConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check the configuration for values training cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            return Err(BpeError::InvalidConfig(
                "vocab_size must be at least 1".to_string(),
            ));
        }
        if self.min_frequency == 0 {
            return Err(BpeError::InvalidConfig(
                "min_frequency must be at least 1".to_string(),
            ));
        }
        if self.seed_alphabet.iter().any(|s| s.is_empty()) {
            return Err(BpeError::InvalidConfig(
                "seed alphabet contains an empty symbol".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the seed alphabet.
    pub fn seed_alphabet<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.seed_alphabet = symbols.into_iter().map(Into::into).collect();
        self
    }

    /// Seed with the 26 lowercase ASCII letters.
    pub fn ascii_lowercase_seed(self) -> Self {
        self.seed_alphabet(('a'..='z').map(String::from))
    }

    /// Set the minimum frequency for merges.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    /// Set the selection strategy.
    pub fn strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Enable or disable parallel recounts.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Enable or disable the progress bar.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Trainer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Training,
    Done,
}

/// Why training stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The vocabulary reached the target size
    VocabularyFull,
    /// No adjacent pair is left in any split
    NoPairs,
    /// The best pair is rarer than `min_frequency`
    BelowMinFrequency,
    /// `vocab_size - |seed alphabet|` merges were performed
    MergeBudget,
}

/// BPE trainer.
///
/// Trains merge rules from a corpus by iteratively fusing the most frequent
/// adjacent symbol pair.
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
    /// Vocabulary being built
    vocab: Vocabulary,
    /// Word frequencies and current splits
    counter: PairCounter,
    /// Rules in discovery order
    rules: RuleSet,
    /// Word extraction shared with the tokenizer
    splitter: WordSplitter,
    state: TrainerState,
    stop_reason: Option<StopReason>,
    /// Size of the seed alphabet, for the merge budget
    seed_len: usize,
    /// Authoritative weighted pair counts (incremental strategy)
    pair_counts: AHashMap<Pair, u64>,
    /// Heap over `pair_counts` (incremental strategy)
    queue: Option<PairPriorityQueue>,
    progress: ProgressBar,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        let vocab = Vocabulary::from_symbols(&config.seed_alphabet);
        let seed_len = vocab.len();
        let progress = Self::progress_bar(&config);

        Self {
            config,
            vocab,
            counter: PairCounter::new(),
            rules: RuleSet::new(),
            splitter: WordSplitter::default(),
            state: TrainerState::Training,
            stop_reason: None,
            seed_len,
            pair_counts: AHashMap::new(),
            queue: None,
            progress,
        }
    }

    fn progress_bar(config: &TrainingConfig) -> ProgressBar {
        if !config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(config.vocab_size as u64);
        let style = ProgressStyle::with_template(
            "[{elapsed_precise}] {msg:<20!} {wide_bar} {pos}/{len} ({percent}%)",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("training merges");
        pb
    }

    /// Train on a corpus of raw documents and return the rule set.
    ///
    /// Preprocesses every document, then merges until done. Calling this on
    /// a trainer that already finished returns its existing rules.
    pub fn train<I, S>(&mut self, corpus: I) -> RuleSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.state == TrainerState::Done {
            warn!("trainer already finished; ignoring additional corpus");
            return self.rules.clone();
        }

        self.preprocess(corpus);
        let reason = self.run();
        info!(
            "training complete: {} rules, vocabulary {} ({:?})",
            self.rules.len(),
            self.vocab.len(),
            reason
        );
        self.rules.clone()
    }

    /// Register every word of every document.
    pub fn preprocess<I, S>(&mut self, corpus: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut documents = 0usize;
        for doc in corpus {
            self.counter
                .add_text(doc.as_ref(), &self.splitter, &mut self.vocab);
            documents += 1;
        }
        // Counts changed, so any heap built so far is out of date
        self.queue = None;

        info!(
            "preprocessed {} documents: {} distinct words, {} occurrences, {} initial symbols",
            documents,
            self.counter.word_count(),
            self.counter.total_word_occurrences(),
            self.vocab.len()
        );
    }

    /// Merge until the trainer is done.
    pub fn run(&mut self) -> StopReason {
        if self.counter.word_count() == 0 && self.state == TrainerState::Training {
            warn!("corpus contains no words; nothing to train");
        }

        self.progress.set_position(self.vocab.len() as u64);
        while self.step() == TrainerState::Training {}
        self.progress.finish_and_clear();

        self.stop_reason.unwrap_or(StopReason::NoPairs)
    }

    /// Perform at most one merge.
    pub fn step(&mut self) -> TrainerState {
        if self.state == TrainerState::Done {
            return self.state;
        }

        if self.vocab.len() >= self.config.vocab_size {
            return self.finish(StopReason::VocabularyFull);
        }
        if self.rules.len() >= self.merge_budget() {
            return self.finish(StopReason::MergeBudget);
        }

        let Some((pair, count)) = self.select() else {
            return self.finish(StopReason::NoPairs);
        };
        if count < self.config.min_frequency {
            return self.finish(StopReason::BelowMinFrequency);
        }

        self.apply_merge(pair, count);
        TrainerState::Training
    }

    fn finish(&mut self, reason: StopReason) -> TrainerState {
        debug!("stopping: {:?}", reason);
        self.state = TrainerState::Done;
        self.stop_reason = Some(reason);
        self.queue = None;
        self.pair_counts.clear();
        self.state
    }

    fn merge_budget(&self) -> usize {
        self.config.vocab_size.saturating_sub(self.seed_len)
    }

    /// Find the best pair and its weighted count.
    fn select(&mut self) -> Option<(Pair, u64)> {
        match self.config.strategy {
            SelectionStrategy::Recount => {
                let stats = if self.config.parallel {
                    self.counter.count_pairs_parallel()
                } else {
                    self.counter.count_pairs_sequential()
                };
                PairCounter::select_best(&stats)
            }
            SelectionStrategy::Incremental => self.select_incremental(),
        }
    }

    fn select_incremental(&mut self) -> Option<(Pair, u64)> {
        if self.queue.is_none() {
            self.build_queue();
        }
        let queue = self.queue.as_mut()?;

        let mut ties = queue.pop_ties();
        let best = match ties.len() {
            0 => return None,
            1 => ties.pop()?,
            _ => {
                let pairs: AHashSet<Pair> = ties.iter().map(|c| c.pair).collect();
                let first = self.counter.first_occurrence(&pairs)?;
                let pos = ties.iter().position(|c| c.pair == first)?;
                let best = ties.swap_remove(pos);
                for loser in ties {
                    queue.push(loser);
                }
                best
            }
        };

        Some((best.pair, best.count))
    }

    fn build_queue(&mut self) {
        let stats = if self.config.parallel {
            self.counter.count_pairs_parallel()
        } else {
            self.counter.count_pairs_sequential()
        };

        let mut queue = PairPriorityQueue::with_capacity(stats.len());
        self.pair_counts.clear();
        for (pair, stat) in stats {
            self.pair_counts.insert(pair, stat.count);
            queue.push(MergeCandidate::new(pair, stat.count));
        }
        self.queue = Some(queue);
    }

    /// Fuse `pair` everywhere, grow the vocabulary and record the rule.
    fn apply_merge(&mut self, pair: Pair, count: u64) {
        let symbols = self
            .vocab
            .symbol(pair.0)
            .cloned()
            .zip(self.vocab.symbol(pair.1).cloned());
        let Some((left, right)) = symbols else {
            // IDs always come from this vocabulary
            self.finish(StopReason::NoPairs);
            return;
        };

        let rule = MergeRule::new(left, right);
        let rank = self.rules.push(&rule);
        let new_id = self.vocab.add_token(&rule.merged);

        let deltas = self.counter.merge_pair_in_words(pair, new_id);
        if let Some(queue) = self.queue.as_mut() {
            Self::update_pair_counts(&mut self.pair_counts, queue, deltas);
        }

        debug!(
            "merge {}: {} [count {}, vocab {}]",
            rank,
            rule,
            count,
            self.vocab.len()
        );
        self.progress.set_position(self.vocab.len() as u64);
    }

    /// Fold merge deltas into the counts and push the changed pairs.
    fn update_pair_counts(
        pair_counts: &mut AHashMap<Pair, u64>,
        queue: &mut PairPriorityQueue,
        deltas: AHashMap<Pair, i64>,
    ) {
        for (pair, delta) in deltas {
            let current = pair_counts.get(&pair).copied().unwrap_or(0);
            let new_count = (current as i64 + delta).max(0) as u64;

            if new_count > 0 {
                pair_counts.insert(pair, new_count);
            } else {
                pair_counts.remove(&pair);
            }
            queue.update(pair, new_count);
        }
    }

    /// Current state.
    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// Why training stopped, once done.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Rules learned so far, in discovery order.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The vocabulary built so far.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Configuration in use.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Word frequencies and splits.
    pub fn counter(&self) -> &PairCounter {
        &self.counter
    }

    /// Current split of a word as symbol strings.
    pub fn word_split(&self, word: &str) -> Option<Vec<&str>> {
        let split = self.counter.split_of(word)?;
        split.iter().map(|&id| self.vocab.get_token(id)).collect()
    }

    /// Consume the trainer, keeping only the rule set.
    pub fn into_rules(self) -> RuleSet {
        self.rules
    }
}

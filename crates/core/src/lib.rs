//! subtok-core - Core BPE data structures
//!
//! This crate provides the pieces shared by training and tokenization:
//! symbols and merge rules, the ordered rule set, the vocabulary, the word
//! splitter and the merge rewrite pass.
//!
//! # Features
//!
//! - Symbol interning with `AHashMap` and compact strings
//! - Ordered rule sets that serialize as `{"left_right": "merged"}` maps
//! - Lazily-invalidated pair priority queue for incremental training
//!
//! # Example
//!
//! ```rust
//! use subtok_core::{MergeRule, RuleSet, WordSplitter, initial_split};
//!
//! let rules = RuleSet::from_rules([MergeRule::new("a", "a"), MergeRule::new("aa", "b")])?;
//!
//! let words = WordSplitter::default().words("AAB!");
//! let mut split = initial_split(&words[0]);
//! rules.apply(&mut split);
//! assert_eq!(split, vec!["aab"]);
//! # Ok::<(), subtok_core::BpeError>(())
//! ```

pub mod error;
pub use error::{BpeError, Result};

pub mod core;
pub use core::{
    merge_pair, MergeCandidate, MergeRule, Pair, PairPriorityQueue, RuleSet, Symbol, Vocab,
    Vocabulary, PAIR_DELIMITER,
};

pub mod pre_tokenizer;
pub use pre_tokenizer::{initial_split, NormalizationForm, Normalizer, WordSplitter};

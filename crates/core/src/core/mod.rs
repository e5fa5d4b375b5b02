//! Core BPE data structures.
//!
//! This module contains the symbol, rule and vocabulary types plus the
//! merge rewrite shared by training and tokenization.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{merge_pair, MergeRule, Pair, RuleSet, Symbol, PAIR_DELIMITER};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use vocab::{Vocab, Vocabulary};

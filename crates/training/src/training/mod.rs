//! Training infrastructure for BPE tokenizers.
//!
//! This module provides the pair counter and the trainer that learns
//! ordered merge rules from text.

pub mod counter;
pub mod trainer;

pub use counter::{PairCounter, PairStat, PairStats, Position};
pub use trainer::{
    BpeTrainer, SelectionStrategy, StopReason, TrainerState, TrainingConfig,
    TrainingConfigBuilder,
};

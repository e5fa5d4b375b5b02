//! subtok-training - BPE training infrastructure
//!
//! This crate learns BPE merge rules from a corpus of raw documents.
//!
//! # Features
//!
//! - Frequency-weighted pair counting, sequential or on the rayon pool
//! - Deterministic merge selection (ties go to the first-seen pair)
//! - Incremental heap-based selection that matches full recounts exactly
//!
//! # Example
//!
//! ```rust
//! use subtok_training::{BpeTrainer, TrainingConfig};
//!
//! let config = TrainingConfig::builder()
//!     .vocab_size(5)
//!     .seed_alphabet(["a", "b", "c"])
//!     .build()?;
//!
//! let mut trainer = BpeTrainer::new(config);
//! let rules = trainer.train(["aab aab aab"]);
//! assert_eq!(rules.len(), 2);
//! # Ok::<(), subtok_training::BpeError>(())
//! ```

pub use subtok_core::{BpeError, Result};

pub mod training;
pub use training::{
    BpeTrainer, PairCounter, SelectionStrategy, StopReason, TrainerState, TrainingConfig,
    TrainingConfigBuilder,
};

//! Subtok-tokenizer - High-level tokenizer API
//!
//! This crate wraps a learned rule set in a [`Tokenizer`] that segments
//! free text, and persists rule sets to disk.
//!
//! # Features
//!
//! - Builder for tokenizers backed by in-memory rules or a rules file
//! - Per-word segmentation cache for interactive use
//! - Loading and saving as ordered JSON or `merges.txt`
//!
//! # Example
//!
//! ```rust
//! use subtok_tokenizer::{Tokenizer, TrainingConfig};
//!
//! let config = TrainingConfig::builder().vocab_size(5).build()?;
//! let tokenizer = Tokenizer::train(["aab aab aab"], config);
//!
//! let encoding = tokenizer.encode("AAB aab!");
//! assert_eq!(encoding.get_tokens(), vec!["aab", "aab"]);
//! # Ok::<(), subtok_tokenizer::BpeError>(())
//! ```

// Re-export core types
pub use subtok_core::{BpeError, MergeRule, NormalizationForm, Result, RuleSet, Symbol};
pub use subtok_training::{SelectionStrategy, TrainingConfig};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Encoding, Tokenizer, TokenizerBuilder};

// IO/Serialization
pub mod io;
pub use io::{RuleFormat, RuleLoader, RuleSaver};

// Utilities
pub mod utils;
pub use utils::{CacheStats, WordCache};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

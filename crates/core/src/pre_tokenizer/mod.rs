//! Pre-tokenization pipeline.
//!
//! Turns raw text into normalized words, the unit both training and
//! tokenization operate on.

pub mod normalize;
pub mod split;

pub use normalize::{NormalizationForm, Normalizer};
pub use split::{initial_split, WordSplitter};

//! Persistence for rule sets.
//!
//! Rule sets are saved either as a JSON object of `"left_right": "merged"`
//! entries in discovery order, or as a `merges.txt` file with one
//! `left right` pair per line.

pub mod format;
pub mod load;
pub mod save;

pub use format::RuleFormat;
pub use load::RuleLoader;
pub use save::RuleSaver;

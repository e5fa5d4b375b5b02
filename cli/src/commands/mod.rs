//! CLI commands for the subtok tokenizer.

pub mod encode;
pub mod interactive;
pub mod run;
pub mod train;

pub use encode::EncodeCommand;
pub use interactive::InteractiveCommand;
pub use run::RunCommand;
pub use train::TrainCommand;

/// Rules file used when none is given.
pub const DEFAULT_RULES_FILE: &str = "bpe_merge_rules.json";

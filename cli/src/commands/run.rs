//! Run command implementation.
//!
//! Reuses saved rules when present; otherwise trains from the given files
//! with a lowercase a-z seed, saves, and starts the interactive loop.

use clap::Parser;
use std::path::PathBuf;

/// Run command arguments.
#[derive(Parser)]
pub struct RunCommand {
    /// Rules file to load, or to create when missing
    #[arg(short, long, default_value = super::DEFAULT_RULES_FILE)]
    pub rules: PathBuf,

    /// Text files to train on when the rules file is missing
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Target vocabulary size when training
    #[arg(long, default_value_t = 700)]
    pub vocab_size: usize,

    /// Hide the progress bars
    #[arg(long)]
    pub no_progress: bool,
}

use super::interactive::repl;
use super::train::{read_corpus, train_rules};
use anyhow::{bail, Context, Result as AnyhowResult};
use std::io;
use subtok_tokenizer::{RuleSet, Tokenizer, TrainingConfig};

pub fn run(cmd: RunCommand) -> AnyhowResult<()> {
    let rules = obtain_rules(&cmd)?;
    let tokenizer = Tokenizer::new(rules);

    let stdin = io::stdin();
    let stdout = io::stdout();
    repl(&tokenizer, 1000, stdin.lock(), stdout.lock())?;
    Ok(())
}

fn obtain_rules(cmd: &RunCommand) -> AnyhowResult<RuleSet> {
    if cmd.rules.exists() {
        println!("Loading merge rules from {}...", cmd.rules.display());
        let tokenizer = Tokenizer::load(&cmd.rules)
            .with_context(|| format!("failed to load rules from {}", cmd.rules.display()))?;
        return Ok(tokenizer.into_rules());
    }

    println!("Merge rules file not found. Starting training...");
    if cmd.input.is_empty() {
        bail!(
            "{} does not exist and no --input files were given to train on",
            cmd.rules.display()
        );
    }

    let config = TrainingConfig::builder()
        .vocab_size(cmd.vocab_size)
        .ascii_lowercase_seed()
        .show_progress(!cmd.no_progress)
        .build()
        .context("invalid training options")?;
    let corpus = read_corpus(&cmd.input, !cmd.no_progress)?;
    let rules = train_rules(&corpus, config);
    println!("Training complete: {} merge rules", rules.len());

    Tokenizer::new(rules.clone())
        .save(&cmd.rules)
        .with_context(|| format!("failed to save rules to {}", cmd.rules.display()))?;
    Ok(rules)
}

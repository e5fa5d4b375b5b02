//! Train command implementation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Pair selection strategy flag.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Recount all pairs every iteration
    Recount,
    /// Update counts from merge deltas
    Incremental,
}

/// Rules file format flag.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Ordered JSON object
    Json,
    /// One `left right` pair per line
    Merges,
}

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Text files to train on; each file is one document
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Where to write the learned rules
    #[arg(short, long, default_value = super::DEFAULT_RULES_FILE)]
    pub output: PathBuf,

    /// Target vocabulary size
    #[arg(long, default_value_t = 700)]
    pub vocab_size: usize,

    /// Minimum weighted pair count for a merge
    #[arg(short, long, default_value_t = 1)]
    pub min_frequency: u64,

    /// Seed the vocabulary with these characters
    #[arg(long, conflicts_with = "no_seed")]
    pub seed: Option<String>,

    /// Start from an empty vocabulary instead of a-z
    #[arg(long)]
    pub no_seed: bool,

    /// Pair selection strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::Incremental)]
    pub strategy: StrategyArg,

    /// Count pairs on all cores
    #[arg(short, long)]
    pub parallel: bool,

    /// Output format; guessed from the extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Hide the progress bars
    #[arg(long)]
    pub no_progress: bool,
}

use anyhow::{Context, Result as AnyhowResult};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::fs;
use std::path::Path;
use std::time::Instant;
use subtok_tokenizer::{
    RuleFormat, RuleSaver, RuleSet, SelectionStrategy, Tokenizer, TrainingConfig,
};

impl From<StrategyArg> for SelectionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Recount => SelectionStrategy::Recount,
            StrategyArg::Incremental => SelectionStrategy::Incremental,
        }
    }
}

impl From<FormatArg> for RuleFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => RuleFormat::Json,
            FormatArg::Merges => RuleFormat::MergesText,
        }
    }
}

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    println!("Training tokenizer...");
    println!("  Inputs: {}", cmd.input.len());
    println!("  Output: {}", cmd.output.display());
    println!("  Vocab size: {}", cmd.vocab_size);
    println!("  Strategy: {:?}", cmd.strategy);
    println!();

    let mut builder = TrainingConfig::builder()
        .vocab_size(cmd.vocab_size)
        .min_frequency(cmd.min_frequency)
        .strategy(cmd.strategy.into())
        .parallel(cmd.parallel)
        .show_progress(!cmd.no_progress);
    builder = match (&cmd.seed, cmd.no_seed) {
        (Some(chars), _) => builder.seed_alphabet(chars.chars().map(String::from)),
        (None, true) => builder,
        (None, false) => builder.ascii_lowercase_seed(),
    };
    let config = builder.build().context("invalid training options")?;

    let corpus = read_corpus(&cmd.input, !cmd.no_progress)?;

    let start = Instant::now();
    let rules = train_rules(&corpus, config);
    println!(
        "Learned {} merge rules in {:.2}s",
        rules.len(),
        start.elapsed().as_secs_f64()
    );

    let format = cmd
        .format
        .map(RuleFormat::from)
        .unwrap_or_else(|| RuleFormat::from_path(&cmd.output));
    RuleSaver::new(&rules)
        .with_format(format)
        .save(&cmd.output)
        .with_context(|| format!("failed to save rules to {}", cmd.output.display()))?;
    println!("Rules saved to {}", cmd.output.display());

    Ok(())
}

/// Read every file as one document.
pub fn read_corpus(paths: &[PathBuf], show_progress: bool) -> AnyhowResult<Vec<String>> {
    let bar = if show_progress {
        let bar = ProgressBar::new(paths.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} reading [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut corpus = Vec::with_capacity(paths.len());
    let mut bytes = 0usize;
    for path in paths {
        bar.set_message(display_name(path));
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read corpus file {}", path.display()))?;
        bytes += text.len();
        corpus.push(text);
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!("read {} documents ({} bytes)", corpus.len(), bytes);
    Ok(corpus)
}

/// Train a rule set on an in-memory corpus.
pub fn train_rules(corpus: &[String], config: TrainingConfig) -> RuleSet {
    Tokenizer::train(corpus, config).into_rules()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_rules_from_documents() {
        let corpus = vec!["aab aab".to_string(), "aab".to_string()];
        let config = TrainingConfig::builder().vocab_size(5).build().unwrap();

        let rules = train_rules(&corpus, config);
        let merged: Vec<&str> = rules.iter().map(|r| r.merged.as_str()).collect();
        assert_eq!(merged, vec!["aa", "aab"]);
    }

    #[test]
    fn test_read_corpus_missing_file() {
        let err = read_corpus(&[PathBuf::from("/nonexistent/corpus.txt")], false).unwrap_err();
        assert!(err.to_string().contains("corpus.txt"));
    }

    #[test]
    fn test_flag_conversions() {
        assert_eq!(
            SelectionStrategy::from(StrategyArg::Recount),
            SelectionStrategy::Recount
        );
        assert_eq!(RuleFormat::from(FormatArg::Merges), RuleFormat::MergesText);
    }
}

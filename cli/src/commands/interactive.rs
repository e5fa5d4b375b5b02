//! Interactive command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Interactive command arguments.
#[derive(Parser)]
pub struct InteractiveCommand {
    /// Path to the saved merge rules
    #[arg(short, long, default_value = super::DEFAULT_RULES_FILE)]
    pub rules: PathBuf,

    /// Number of word segmentations kept between lines
    #[arg(long, default_value_t = 1000)]
    pub cache_size: usize,
}

use anyhow::{Context, Result as AnyhowResult};
use log::debug;
use std::io::{self, BufRead, Write};
use subtok_tokenizer::{Tokenizer, WordCache};

const PROMPT: &str = "Enter a string to be tokenized (or 'q' to quit): ";

pub fn run(cmd: InteractiveCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.rules)
        .with_context(|| format!("failed to load rules from {}", cmd.rules.display()))?;
    println!("Loaded {} merge rules", tokenizer.rules().len());

    let stdin = io::stdin();
    let stdout = io::stdout();
    repl(&tokenizer, cmd.cache_size, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Tokenize lines from `input` until the sentinel `q` or end of input.
///
/// Returns the number of lines tokenized.
pub fn repl<R, W>(
    tokenizer: &Tokenizer,
    cache_size: usize,
    mut input: R,
    mut output: W,
) -> AnyhowResult<usize>
where
    R: BufRead,
    W: Write,
{
    let mut cache = WordCache::with_capacity(cache_size);
    let mut line = String::new();
    let mut handled = 0usize;

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line).context("failed to read input")? == 0 {
            writeln!(output)?;
            break;
        }
        let text = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        if text.eq_ignore_ascii_case("q") {
            break;
        }

        let tokens = tokenizer.tokenize_cached(text, &mut cache);
        let tokens: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
        writeln!(output, "Tokenized: {:?}", tokens)?;
        handled += 1;
    }

    let stats = cache.stats();
    debug!(
        "interactive session: {} lines, {} cached words, hit rate {:?}",
        handled, stats.entries, stats.hit_rate
    );
    Ok(handled)
}

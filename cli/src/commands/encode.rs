//! Encode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the saved merge rules
    #[arg(short, long, default_value = super::DEFAULT_RULES_FILE)]
    pub rules: PathBuf,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Encode each input line separately
    #[arg(short, long)]
    pub lines: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

use anyhow::{Context, Result as AnyhowResult};
use subtok_tokenizer::{Encoding, Tokenizer};

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.rules)
        .with_context(|| format!("failed to load rules from {}", cmd.rules.display()))?;

    // Read input text (from stdin if "-")
    let input_text = if cmd.input == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        cmd.input
    };

    let encodings = if cmd.lines {
        let lines: Vec<String> = input_text.lines().map(str::to_string).collect();
        tokenizer.encode_batch(&lines)
    } else {
        vec![tokenizer.encode(&input_text)]
    };
    let output = render(&encodings);

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            let total: usize = encodings.iter().map(Encoding::len).sum();
            println!("Encoded {} tokens to {}", total, path.display());
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}

/// One line of space-separated tokens per encoding.
fn render(encodings: &[Encoding]) -> String {
    let mut out = String::new();
    for encoding in encodings {
        out.push_str(&encoding.get_tokens().join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtok_tokenizer::{MergeRule, RuleSet};

    #[test]
    fn test_render_one_line_per_encoding() {
        let rules = RuleSet::from_rules([MergeRule::new("a", "a"), MergeRule::new("aa", "b")])
            .unwrap();
        let tokenizer = Tokenizer::new(rules);
        let lines = vec!["aab ab".to_string(), "42".to_string()];

        assert_eq!(render(&tokenizer.encode_batch(&lines)), "aab a b\n\n");
    }
}

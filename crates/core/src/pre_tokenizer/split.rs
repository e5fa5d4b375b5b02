//! Word extraction for pre-tokenization.
//!
//! A word is a maximal run of letters, after lowercasing, made up only of
//! `a` to `z`. Runs holding any other letter (`café`, `naïve`) are dropped
//! whole. Digits, `_`, punctuation and whitespace are boundaries.

use super::normalize::Normalizer;
use crate::core::Symbol;
use regex::Regex;
use std::sync::OnceLock;

const LETTER_RUN_PATTERN: &str = r"\p{Alphabetic}+";

fn letter_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(LETTER_RUN_PATTERN).expect("letter run pattern is a valid regex")
    })
}

fn is_word(run: &str) -> bool {
    run.bytes().all(|b| b.is_ascii_lowercase())
}

/// Splits raw text into normalized words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordSplitter {
    normalizer: Normalizer,
}

impl WordSplitter {
    /// Create a splitter with the given normalizer.
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    /// Extract words from `text`, in order of appearance.
    pub fn words(&self, text: &str) -> Vec<Symbol> {
        let normalized = self.normalizer.normalize(text);
        letter_runs()
            .find_iter(&normalized)
            .map(|m| m.as_str())
            .filter(|run| is_word(run))
            .map(Symbol::new)
            .collect()
    }

    /// Visit each word of `text` without collecting.
    pub fn for_each_word<F: FnMut(&str)>(&self, text: &str, mut f: F) {
        let normalized = self.normalizer.normalize(text);
        for m in letter_runs().find_iter(&normalized) {
            if is_word(m.as_str()) {
                f(m.as_str());
            }
        }
    }
}

/// Initial character-level split of a word: one symbol per character.
pub fn initial_split(word: &str) -> Vec<Symbol> {
    let mut buf = [0u8; 4];
    word.chars()
        .map(|c| Symbol::new(c.encode_utf8(&mut buf)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_lowercase_runs() {
        let splitter = WordSplitter::default();
        let words = splitter.words("Hello, World! it's 2024");
        assert_eq!(words, vec!["hello", "world", "it", "s"]);
    }

    #[test]
    fn test_digits_are_boundaries() {
        let splitter = WordSplitter::default();
        assert_eq!(splitter.words("abc123def"), vec!["abc", "def"]);
        assert_eq!(splitter.words("snake_case"), vec!["snake", "case"]);
    }

    #[test]
    fn test_no_alphabetic_runs() {
        let splitter = WordSplitter::default();
        assert!(splitter.words("123 456").is_empty());
        assert!(splitter.words("").is_empty());
    }

    #[test]
    fn test_runs_with_non_ascii_letters_are_dropped() {
        let splitter = WordSplitter::default();
        assert_eq!(splitter.words("café au lait naïve"), vec!["au", "lait"]);
        assert_eq!(splitter.words("Ünïcode, plain"), vec!["plain"]);

        let mut seen = Vec::new();
        splitter.for_each_word("déjà vu", |w| seen.push(w.to_string()));
        assert_eq!(seen, vec!["vu"]);
    }

    #[test]
    fn test_for_each_word_matches_words() {
        let splitter = WordSplitter::default();
        let mut seen = Vec::new();
        splitter.for_each_word("The cat sat.", |w| seen.push(w.to_string()));
        assert_eq!(seen, vec!["the", "cat", "sat"]);
    }

    #[test]
    fn test_initial_split() {
        assert_eq!(initial_split("aab"), vec!["a", "a", "b"]);
        assert!(initial_split("").is_empty());
    }
}

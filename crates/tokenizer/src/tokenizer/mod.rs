//! Main tokenizer implementation.
//!
//! The tokenizer needs nothing but an ordered rule set. Text is split into
//! words exactly as during training, each word starts as one symbol per
//! character, and every rule is replayed in rank order over every word.

use crate::io::{RuleFormat, RuleLoader, RuleSaver};
use crate::utils::WordCache;
use ahash::AHashMap;
use log::debug;
use std::path::{Path, PathBuf};
use subtok_core::{
    initial_split, BpeError, NormalizationForm, Normalizer, Result, RuleSet, Symbol, WordSplitter,
};
use subtok_training::{BpeTrainer, TrainingConfig};

/// Where the builder gets its rules from.
#[derive(Debug, Clone)]
enum RuleSource {
    Rules(RuleSet),
    File(PathBuf, Option<RuleFormat>),
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    source: Option<RuleSource>,
    normalization: NormalizationForm,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an in-memory rule set.
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.source = Some(RuleSource::Rules(rules));
        self
    }

    /// Load rules from a file; the format follows the extension.
    pub fn rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(RuleSource::File(path.into(), None));
        self
    }

    /// Load rules from a file in an explicit format.
    pub fn rules_file_with_format(mut self, path: impl Into<PathBuf>, format: RuleFormat) -> Self {
        self.source = Some(RuleSource::File(path.into(), Some(format)));
        self
    }

    /// Set the normalization applied before word extraction.
    pub fn normalization(mut self, form: NormalizationForm) -> Self {
        self.normalization = form;
        self
    }

    /// Build the tokenizer, loading rules if a file was given.
    pub fn build(self) -> Result<Tokenizer> {
        let rules = match self.source {
            Some(RuleSource::Rules(rules)) => rules,
            Some(RuleSource::File(path, Some(format))) => {
                RuleLoader::load_with_format(&path, format)?
            }
            Some(RuleSource::File(path, None)) => RuleLoader::load(&path)?,
            None => {
                return Err(BpeError::InvalidConfig(
                    "tokenizer needs a rule set or a rules file".to_string(),
                ))
            }
        };

        Ok(Tokenizer {
            rules,
            splitter: WordSplitter::new(Normalizer::new(self.normalization)),
        })
    }
}

/// Main tokenizer struct.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Merge rules in rank order
    rules: RuleSet,
    /// Word extraction
    splitter: WordSplitter,
}

impl Tokenizer {
    /// Create a tokenizer from a rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            splitter: WordSplitter::default(),
        }
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Train a rule set on `corpus` and wrap it in a tokenizer.
    pub fn train<I, S>(corpus: I, config: TrainingConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trainer = BpeTrainer::new(config);
        trainer.train(corpus);
        Self::new(trainer.into_rules())
    }

    /// Load a tokenizer from a rules file.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(RuleLoader::load(path)?))
    }

    /// Save the rule set; the format follows the extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        RuleSaver::new(&self.rules)
            .with_format(RuleFormat::from_path(path))
            .save(path)
    }

    /// Segment one normalized word.
    pub fn segment_word(&self, word: &str) -> Vec<Symbol> {
        let mut split = initial_split(word);
        self.rules.apply(&mut split);
        split
    }

    /// Tokenize text into subword symbols.
    ///
    /// Words are segmented independently and their splits concatenated in
    /// input order. Text without alphabetic runs yields no tokens.
    pub fn tokenize(&self, text: &str) -> Vec<Symbol> {
        let words = self.splitter.words(text);
        let mut seen: AHashMap<&str, Vec<Symbol>> = AHashMap::new();
        let mut tokens = Vec::new();

        for word in &words {
            let split = seen
                .entry(word.as_str())
                .or_insert_with(|| self.segment_word(word));
            tokens.extend(split.iter().cloned());
        }

        debug!("tokenized {} words into {} tokens", words.len(), tokens.len());
        tokens
    }

    /// Tokenize text, reusing segmentations from `cache`.
    pub fn tokenize_cached(&self, text: &str, cache: &mut WordCache) -> Vec<Symbol> {
        let mut tokens = Vec::new();
        self.splitter.for_each_word(text, |word| {
            tokens.extend(cache.get_or_segment(word, |w| self.segment_word(w)));
        });
        tokens
    }

    /// Encode text.
    pub fn encode(&self, text: &str) -> Encoding {
        Encoding {
            tokens: self.tokenize(text),
            text: text.to_string(),
        }
    }

    /// Encode a batch of texts (parallelized).
    pub fn encode_batch(&self, texts: &[String]) -> Vec<Encoding> {
        use rayon::prelude::*;

        texts.par_iter().map(|text| self.encode(text)).collect()
    }

    /// The rule set in rank order.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Consume the tokenizer, returning its rule set.
    pub fn into_rules(self) -> RuleSet {
        self.rules
    }
}

/// Result of encoding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Subword tokens in input order
    pub tokens: Vec<Symbol>,
    /// Original text
    pub text: String,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get the tokens as string slices.
    pub fn get_tokens(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtok_core::MergeRule;
    use subtok_training::SelectionStrategy;

    fn aab_rules() -> RuleSet {
        RuleSet::from_rules([MergeRule::new("a", "a"), MergeRule::new("aa", "b")]).unwrap()
    }

    #[test]
    fn test_scenario_tokens() {
        let tokenizer = Tokenizer::new(aab_rules());

        assert_eq!(tokenizer.tokenize("aab"), vec!["aab"]);
        assert_eq!(tokenizer.tokenize("aabaab"), vec!["aab", "aab"]);
        assert_eq!(tokenizer.tokenize("AAB, aa b!"), vec!["aab", "aa", "b"]);
    }

    #[test]
    fn test_no_alphabetic_text() {
        let tokenizer = Tokenizer::new(aab_rules());
        assert!(tokenizer.tokenize("123 456").is_empty());
        assert!(tokenizer.encode("...").is_empty());
        assert_eq!(tokenizer.tokenize("naïve café, aab"), vec!["aab"]);
    }

    #[test]
    fn test_unknown_pairs_are_noops() {
        let tokenizer = Tokenizer::new(aab_rules());
        assert_eq!(tokenizer.tokenize("xyz"), vec!["x", "y", "z"]);
        assert_eq!(tokenizer.segment_word("q"), vec!["q"]);
    }

    #[test]
    fn test_rule_order_matters() {
        // Applying (b, c) first would leave "a" alone
        let ordered =
            RuleSet::from_rules([MergeRule::new("a", "b"), MergeRule::new("b", "c")]).unwrap();
        let reversed =
            RuleSet::from_rules([MergeRule::new("b", "c"), MergeRule::new("a", "b")]).unwrap();

        assert_eq!(Tokenizer::new(ordered).tokenize("abc"), vec!["ab", "c"]);
        assert_eq!(Tokenizer::new(reversed).tokenize("abc"), vec!["a", "bc"]);
    }

    #[test]
    fn test_cached_matches_uncached() {
        let tokenizer = Tokenizer::train(
            ["the cat and the hat sat on the mat with that cat"],
            TrainingConfig::builder()
                .vocab_size(40)
                .strategy(SelectionStrategy::Recount)
                .build()
                .unwrap(),
        );

        let mut cache = WordCache::with_capacity(4);
        for text in ["the cat", "that hat sat", "the cat the mat", "xyz the"] {
            assert_eq!(
                tokenizer.tokenize_cached(text, &mut cache),
                tokenizer.tokenize(text)
            );
        }
        assert!(cache.stats().hit_rate.unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn test_tokens_concatenate_to_words() {
        let corpus = ["lower lowest newer newest wider widest low new wide"];
        let tokenizer = Tokenizer::train(
            corpus,
            TrainingConfig::builder().vocab_size(30).build().unwrap(),
        );

        let text = "Slowest, renewed; widen 42 times";
        let joined: String = tokenizer
            .tokenize(text)
            .iter()
            .map(|t| t.as_str())
            .collect();
        assert_eq!(joined, "slowestrenewedwidentimes");
    }

    #[test]
    fn test_encode_batch() {
        let tokenizer = Tokenizer::new(aab_rules());
        let texts = vec!["aab".to_string(), "b aa".to_string()];
        let encodings = tokenizer.encode_batch(&texts);

        assert_eq!(encodings.len(), 2);
        assert_eq!(encodings[0].get_tokens(), vec!["aab"]);
        assert_eq!(encodings[1].get_tokens(), vec!["b", "aa"]);
        assert_eq!(encodings[1].text, "b aa");
    }

    #[test]
    fn test_builder_requires_rules() {
        assert!(Tokenizer::builder().build().is_err());

        let tokenizer = Tokenizer::builder()
            .rules(aab_rules())
            .normalization(NormalizationForm::None)
            .build()
            .unwrap();
        // Without lowercasing, runs with capitals are not words
        assert_eq!(tokenizer.tokenize("AaB aab"), vec!["aab"]);
    }

    #[test]
    fn test_save_load_same_tokenization() {
        let dir = tempfile::tempdir().unwrap();
        let tokenizer = Tokenizer::train(
            ["she sells sea shells by the sea shore", "the shells she sells are sea shells"],
            TrainingConfig::builder().vocab_size(45).build().unwrap(),
        );
        assert!(!tokenizer.rules().is_empty());

        for name in ["rules.json", "merges.txt"] {
            let path = dir.path().join(name);
            tokenizer.save(&path).unwrap();

            let reloaded = Tokenizer::builder().rules_file(&path).build().unwrap();
            assert_eq!(reloaded.rules(), tokenizer.rules());
            for text in ["she sells sea shells", "seashore", "unrelated words 123"] {
                assert_eq!(reloaded.tokenize(text), tokenizer.tokenize(text));
            }
        }
    }

    #[test]
    fn test_builder_surfaces_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "not json").unwrap();

        let err = Tokenizer::builder().rules_file(&path).build().unwrap_err();
        assert!(err.is_malformed());

        let err = Tokenizer::builder()
            .rules_file_with_format(&path, RuleFormat::MergesText)
            .build()
            .unwrap_err();
        assert!(err.is_malformed());
    }
}

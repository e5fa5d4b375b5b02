//! Vocabulary storage and lookup.
//!
//! The vocabulary is the set of every distinct symbol seen or produced
//! during training. Symbols are interned: each gets a `u32` ID in insertion
//! order, so equal strings always share one ID.

use ahash::AHashMap;
use compact_str::CompactString;

/// Forward mapping: symbol string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Vocabulary with forward mapping and an ID-indexed reverse table.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// Forward mapping: symbol string -> ID
    vocab: Vocab,
    /// Reverse mapping, indexed by ID
    symbols: Vec<CompactString>,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vocabulary seeded with the given symbols.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::new();
        for symbol in symbols {
            vocab.add_token(symbol.as_ref());
        }
        vocab
    }

    /// Add a symbol to the vocabulary.
    ///
    /// Returns the ID assigned to the symbol, or its existing ID.
    pub fn add_token(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.vocab.get(token) {
            return id;
        }

        let token = CompactString::new(token);
        let id = self.symbols.len() as u32;
        self.symbols.push(token.clone());
        self.vocab.insert(token, id);
        id
    }

    /// Get the ID for a symbol string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the symbol string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(|s| s.as_str())
    }

    /// Get the symbol for an ID, as the owned symbol type.
    #[inline]
    pub fn symbol(&self, id: u32) -> Option<&CompactString> {
        self.symbols.get(id as usize)
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.vocab.contains_key(token)
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate symbols in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.symbols.iter().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_token() {
        let mut vocab = Vocabulary::new();
        let id1 = vocab.add_token("hello");
        let id2 = vocab.add_token("world");

        assert_eq!(id1, 0);
        assert_eq!(id2, 1);
        assert_eq!(vocab.get_id("hello"), Some(0));
        assert_eq!(vocab.get_id("world"), Some(1));
        assert_eq!(vocab.get_token(0), Some("hello"));
        assert_eq!(vocab.get_token(1), Some("world"));
        assert_eq!(vocab.get_token(2), None);
    }

    #[test]
    fn test_add_duplicate_token() {
        let mut vocab = Vocabulary::new();
        let id1 = vocab.add_token("hello");
        let id2 = vocab.add_token("hello");

        assert_eq!(id1, id2);
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn test_from_symbols_keeps_order() {
        let vocab = Vocabulary::from_symbols(["c", "a", "b", "a"]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert!(vocab.contains("b"));
        assert!(!vocab.contains("d"));
    }
}

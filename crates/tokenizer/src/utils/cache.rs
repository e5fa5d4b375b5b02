//! Segmentation cache for repeated words.
//!
//! A word's segmentation depends only on the word and the rule set, so the
//! interactive loop keeps one of these across lines.

use ahash::AHashMap;
use compact_str::CompactString;
use std::collections::VecDeque;
use subtok_core::Symbol;

/// LRU cache from word to its final split.
pub struct WordCache {
    /// Word -> segmented symbols
    cache: AHashMap<CompactString, Vec<Symbol>>,
    /// Maximum number of entries in the cache
    capacity: usize,
    /// Least recently used at the front
    order: VecDeque<CompactString>,
    hits: u64,
    misses: u64,
}

impl WordCache {
    /// Create a new cache with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: AHashMap::with_capacity(capacity),
            capacity,
            order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a new cache with default capacity (1000).
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Get the cached split for `word` or compute it with `segment`.
    pub fn get_or_segment<F>(&mut self, word: &str, segment: F) -> Vec<Symbol>
    where
        F: FnOnce(&str) -> Vec<Symbol>,
    {
        if let Some(cached) = self.cache.get(word).cloned() {
            self.hits += 1;
            self.touch(word);
            return cached;
        }

        self.misses += 1;
        let split = segment(word);
        if self.capacity > 0 {
            self.insert(CompactString::new(word), split.clone());
        }
        split
    }

    fn touch(&mut self, word: &str) {
        if let Some(pos) = self.order.iter().position(|w| w == word) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }

    fn insert(&mut self, key: CompactString, value: Vec<Symbol>) {
        while self.order.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.cache.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.cache.insert(key, value);
    }

    /// Clear all entries from the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get the cache capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            entries: self.cache.len(),
            capacity: self.capacity,
            hit_rate: (lookups > 0).then(|| self.hits as f64 / lookups as f64),
        }
    }
}

impl Default for WordCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Fraction of lookups served from the cache (None before any lookup)
    pub hit_rate: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(parts: &[&str]) -> Vec<Symbol> {
        parts.iter().map(|s| Symbol::new(s)).collect()
    }

    #[test]
    fn test_cache_hit_miss() {
        let mut cache = WordCache::with_capacity(3);

        let first = cache.get_or_segment("hello", |_| split(&["he", "llo"]));
        assert_eq!(first, split(&["he", "llo"]));

        let second = cache.get_or_segment("hello", |_| panic!("Should not segment"));
        assert_eq!(second, first);

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate, Some(0.5));
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = WordCache::with_capacity(2);

        cache.get_or_segment("a", |_| split(&["a"]));
        cache.get_or_segment("b", |_| split(&["b"]));
        // Access "a" to make it recently used
        cache.get_or_segment("a", |_| split(&["a"]));
        cache.get_or_segment("c", |_| split(&["c"]));

        assert!(cache.cache.contains_key("a"));
        assert!(!cache.cache.contains_key("b"));
        assert!(cache.cache.contains_key("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let mut cache = WordCache::with_capacity(0);
        cache.get_or_segment("a", |_| split(&["a"]));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cache = WordCache::new();
        cache.get_or_segment("hello", |_| split(&["hello"]));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 1000);
        assert_eq!(cache.stats().hit_rate, Some(0.0));
    }
}

//! Merge rules and the merge rewrite pass.
//!
//! Rules are kept in the order they were discovered. That order is part of
//! the rule set's meaning: the tokenizer replays rules strictly in sequence.

use crate::error::{BpeError, Result};
use ahash::AHashMap;
use compact_str::CompactString;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A symbol: a single character or a fused run of characters.
pub type Symbol = CompactString;

/// A pair of symbol IDs that can be merged.
pub type Pair = (u32, u32);

/// Delimiter joining left and right symbols in persisted rule keys.
pub const PAIR_DELIMITER: char = '_';

/// One learned merge: `left` followed by `right` becomes `merged`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeRule {
    pub left: Symbol,
    pub right: Symbol,
    pub merged: Symbol,
}

impl MergeRule {
    /// Create a rule whose result is the concatenation of both sides.
    pub fn new(left: impl Into<Symbol>, right: impl Into<Symbol>) -> Self {
        let left = left.into();
        let right = right.into();
        let mut merged = left.clone();
        merged.push_str(&right);
        Self {
            left,
            right,
            merged,
        }
    }

    /// Persisted key form, e.g. `a_b`.
    pub fn key(&self) -> String {
        format!("{}{}{}", self.left, PAIR_DELIMITER, self.right)
    }

    /// Parse a persisted key/value entry back into a rule.
    pub fn from_entry(key: &str, merged: &str) -> Result<Self> {
        let mut parts = key.split(PAIR_DELIMITER);
        let (left, right) = match (parts.next(), parts.next(), parts.next()) {
            (Some(l), Some(r), None) if !l.is_empty() && !r.is_empty() => (l, r),
            _ => {
                return Err(BpeError::MalformedRuleData(format!(
                    "key '{}' is not of the form left{}right",
                    key, PAIR_DELIMITER
                )))
            }
        };

        let rule = Self::new(left, right);
        if rule.merged != merged {
            return Err(BpeError::MalformedRuleData(format!(
                "rule '{}' maps to '{}', expected '{}'",
                key, merged, rule.merged
            )));
        }

        Ok(rule)
    }
}

impl fmt::Display for MergeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) -> {}", self.left, self.right, self.merged)
    }
}

/// Ordered collection of merge rules with pair lookup.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Rules in discovery order
    rules: Vec<MergeRule>,
    /// (left, right) -> rank
    ranks: AHashMap<(Symbol, Symbol), u32>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty rule set with room for `capacity` rules.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
            ranks: AHashMap::with_capacity(capacity),
        }
    }

    /// Append a rule, validating it.
    ///
    /// Returns the rank the rule was given. Fails with
    /// [`BpeError::MalformedRuleData`] if a side is empty, the merged symbol
    /// is not the concatenation of both sides, or the pair is already known.
    pub fn try_push(&mut self, rule: MergeRule) -> Result<u32> {
        if rule.left.is_empty() || rule.right.is_empty() {
            return Err(BpeError::MalformedRuleData(format!(
                "rule {} has an empty side",
                rule
            )));
        }
        if rule.merged.len() != rule.left.len() + rule.right.len()
            || !rule.merged.starts_with(rule.left.as_str())
            || !rule.merged.ends_with(rule.right.as_str())
        {
            return Err(BpeError::MalformedRuleData(format!(
                "rule {} does not concatenate its sides",
                rule
            )));
        }

        let key = (rule.left.clone(), rule.right.clone());
        if self.ranks.contains_key(&key) {
            return Err(BpeError::MalformedRuleData(format!(
                "duplicate rule for pair ({}, {})",
                rule.left, rule.right
            )));
        }

        let rank = self.rules.len() as u32;
        self.ranks.insert(key, rank);
        self.rules.push(rule);
        Ok(rank)
    }

    /// Append a rule built with [`MergeRule::new`].
    ///
    /// Used by training, where both sides are known non-empty symbols. A
    /// pair that already has a rule keeps its original rank.
    pub fn push(&mut self, rule: &MergeRule) -> u32 {
        let next = self.rules.len() as u32;
        let rank = *self
            .ranks
            .entry((rule.left.clone(), rule.right.clone()))
            .or_insert(next);
        if rank == next {
            self.rules.push(rule.clone());
        }
        rank
    }

    /// Rank of the rule for `(left, right)`, if any.
    #[inline]
    pub fn rank(&self, left: &str, right: &str) -> Option<u32> {
        self.ranks
            .get(&(Symbol::new(left), Symbol::new(right)))
            .copied()
    }

    /// Rule at the given rank.
    #[inline]
    pub fn get(&self, rank: usize) -> Option<&MergeRule> {
        self.rules.get(rank)
    }

    /// Iterate rules in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, MergeRule> {
        self.rules.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite `split` with every rule in order.
    ///
    /// Returns the number of fusions performed.
    pub fn apply(&self, split: &mut Vec<Symbol>) -> usize {
        let mut fused = 0;
        for rule in &self.rules {
            if split.len() < 2 {
                break;
            }
            fused += merge_pair(split, &rule.left, &rule.right, &rule.merged);
        }
        fused
    }

    /// Build a rule set from rules, validating each in order.
    pub fn from_rules(rules: impl IntoIterator<Item = MergeRule>) -> Result<Self> {
        let mut set = Self::new();
        for rule in rules {
            set.try_push(rule)?;
        }
        Ok(set)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a MergeRule;
    type IntoIter = std::slice::Iter<'a, MergeRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl PartialEq for RuleSet {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Eq for RuleSet {}

// Serialized as a JSON-style map `{"a_b": "ab", ...}` whose entry order is
// the discovery order.
impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for rule in &self.rules {
            map.serialize_entry(&rule.key(), rule.merged.as_str())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of \"left_right\" keys to merged symbols")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<RuleSet, A::Error> {
                let mut set = RuleSet::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, merged)) = access.next_entry::<String, String>()? {
                    MergeRule::from_entry(&key, &merged)
                        .and_then(|rule| set.try_push(rule))
                        .map_err(serde::de::Error::custom)?;
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}

/// Fuse every non-overlapping `(left, right)` occurrence in `split` into
/// `merged`, scanning left to right.
///
/// Advances two positions on a match and one otherwise. Returns the number
/// of fusions; a split without the pair is left untouched.
pub fn merge_pair<T: PartialEq + Clone>(
    split: &mut Vec<T>,
    left: &T,
    right: &T,
    merged: &T,
) -> usize {
    let n = split.len();
    if n < 2 {
        return 0;
    }

    let mut read = 0;
    let mut write = 0;
    let mut fused = 0;

    while read < n {
        if read + 1 < n && split[read] == *left && split[read + 1] == *right {
            split[write] = merged.clone();
            read += 2;
            fused += 1;
        } else {
            if write != read {
                split.swap(write, read);
            }
            read += 1;
        }
        write += 1;
    }

    split.truncate(write);
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syms(parts: &[&str]) -> Vec<Symbol> {
        parts.iter().map(|s| Symbol::new(s)).collect()
    }

    #[test]
    fn test_merge_pair_left_to_right() {
        let mut split = syms(&["a", "a", "a"]);
        let n = merge_pair(&mut split, &"a".into(), &"a".into(), &"aa".into());
        assert_eq!(n, 1);
        assert_eq!(split, syms(&["aa", "a"]));

        let mut split = syms(&["a", "a", "a", "a"]);
        merge_pair(&mut split, &"a".into(), &"a".into(), &"aa".into());
        assert_eq!(split, syms(&["aa", "aa"]));
    }

    #[test]
    fn test_merge_pair_noop() {
        let mut split = syms(&["x", "y", "z"]);
        let before = split.clone();
        let n = merge_pair(&mut split, &"a".into(), &"b".into(), &"ab".into());
        assert_eq!(n, 0);
        assert_eq!(split, before);
    }

    #[test]
    fn test_merge_pair_on_ids() {
        let mut split = vec![1u32, 2, 3, 1, 2];
        let n = merge_pair(&mut split, &1, &2, &9);
        assert_eq!(n, 2);
        assert_eq!(split, vec![9, 3, 9]);
    }

    #[test]
    fn test_rule_new_concatenates() {
        let rule = MergeRule::new("aa", "b");
        assert_eq!(rule.merged, "aab");
        assert_eq!(rule.key(), "aa_b");
        assert_eq!(rule.to_string(), "(aa, b) -> aab");
    }

    #[test]
    fn test_from_entry_rejects_bad_keys() {
        assert!(MergeRule::from_entry("ab", "ab").is_err());
        assert!(MergeRule::from_entry("a_b_c", "abc").is_err());
        assert!(MergeRule::from_entry("_b", "b").is_err());
        assert!(MergeRule::from_entry("a_b", "ba").is_err());
        assert_eq!(
            MergeRule::from_entry("th_e", "the").unwrap(),
            MergeRule::new("th", "e")
        );
    }

    #[test]
    fn test_try_push_ranks_and_duplicates() {
        let mut rules = RuleSet::new();
        assert_eq!(rules.try_push(MergeRule::new("a", "a")).unwrap(), 0);
        assert_eq!(rules.try_push(MergeRule::new("aa", "b")).unwrap(), 1);
        assert!(rules.try_push(MergeRule::new("a", "a")).is_err());

        assert_eq!(rules.rank("aa", "b"), Some(1));
        assert_eq!(rules.rank("b", "a"), None);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_push_keeps_first_rank() {
        let mut rules = RuleSet::new();
        assert_eq!(rules.push(&MergeRule::new("t", "h")), 0);
        assert_eq!(rules.push(&MergeRule::new("th", "e")), 1);
        assert_eq!(rules.push(&MergeRule::new("t", "h")), 0);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.get(1).unwrap().merged, "the");
    }

    #[test]
    fn test_try_push_rejects_inconsistent_merge() {
        let mut rules = RuleSet::new();
        let rule = MergeRule {
            left: "a".into(),
            right: "b".into(),
            merged: "abc".into(),
        };
        assert!(rules.try_push(rule).unwrap_err().is_malformed());
        assert!(rules.is_empty());
    }

    #[test]
    fn test_apply_in_order() {
        let rules =
            RuleSet::from_rules([MergeRule::new("a", "a"), MergeRule::new("aa", "b")]).unwrap();

        let mut split = syms(&["a", "a", "b", "a", "a", "b"]);
        rules.apply(&mut split);
        assert_eq!(split, syms(&["aab", "aab"]));
    }

    #[test]
    fn test_serde_preserves_order() {
        let rules = RuleSet::from_rules([
            MergeRule::new("z", "z"),
            MergeRule::new("a", "b"),
            MergeRule::new("zz", "ab"),
        ])
        .unwrap();

        let json = serde_json::to_string(&rules).unwrap();
        assert_eq!(json, r#"{"z_z":"zz","a_b":"ab","zz_ab":"zzab"}"#);

        let back: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rules);
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        assert!(serde_json::from_str::<RuleSet>(r#"{"ab":"ab"}"#).is_err());
        assert!(serde_json::from_str::<RuleSet>(r#"["a_b"]"#).is_err());
        assert!(serde_json::from_str::<RuleSet>(r#"{"a_b":1}"#).is_err());
    }
}

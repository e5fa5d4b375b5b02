//! Load functionality for persisted rule sets.

use super::format::RuleFormat;
use log::info;
use std::fs;
use std::path::Path;
use subtok_core::{BpeError, Result, RuleSet};

/// Rule set loader - reads rule sets from disk.
pub struct RuleLoader;

impl RuleLoader {
    /// Load a rule set, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<RuleSet> {
        Self::load_with_format(path, RuleFormat::from_path(path))
    }

    /// Load a rule set in an explicit format.
    ///
    /// Fails with [`BpeError::IoUnavailable`] if the file cannot be read and
    /// [`BpeError::MalformedRuleData`] if its content does not parse.
    pub fn load_with_format(path: &Path, format: RuleFormat) -> Result<RuleSet> {
        let content = fs::read_to_string(path).map_err(|e| BpeError::io(path, e))?;
        let rules = format.parse(&content).map_err(|e| match e {
            BpeError::MalformedRuleData(msg) => {
                BpeError::MalformedRuleData(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        info!("loaded {} merge rules from {}", rules.len(), path.display());
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::save::RuleSaver;
    use subtok_core::MergeRule;

    fn sample() -> RuleSet {
        RuleSet::from_rules([
            MergeRule::new("e", "r"),
            MergeRule::new("t", "h"),
            MergeRule::new("th", "e"),
            MergeRule::new("the", "r"),
        ])
        .unwrap()
    }

    #[test]
    fn test_load_roundtrip_both_formats() {
        let dir = tempfile::tempdir().unwrap();

        for name in ["rules.json", "merges.txt"] {
            let path = dir.path().join(name);
            let format = RuleFormat::from_path(&path);
            RuleSaver::new(&sample())
                .with_format(format)
                .save(&path)
                .unwrap();

            let loaded = RuleLoader::load(&path).unwrap();
            assert_eq!(loaded, sample(), "{}", name);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuleLoader::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BpeError::IoUnavailable { .. }));
    }

    #[test]
    fn test_malformed_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"a_b": "ab", "oops": "x"}"#).unwrap();

        let err = RuleLoader::load(&path).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("broken.json"));
    }
}

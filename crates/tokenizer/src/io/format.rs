//! Format definitions for rule set serialization.
//!
//! Both formats keep discovery order: JSON entries are written and read in
//! sequence, and `merges.txt` lines are ranks.

use std::path::Path;
use subtok_core::{BpeError, MergeRule, Result, RuleSet};

/// Persisted rule set formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleFormat {
    /// `{"a_b": "ab", ...}` with entries in discovery order
    #[default]
    Json,
    /// One `left right` pair per line, rank order, merged symbol implied
    MergesText,
}

impl RuleFormat {
    /// Guess the format from a file extension; anything but `.txt` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => Self::MergesText,
            _ => Self::Json,
        }
    }

    /// Render a rule set in this format.
    pub fn render(self, rules: &RuleSet) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(rules)
                .map_err(|e| BpeError::MalformedRuleData(format!("cannot encode rules: {}", e))),
            Self::MergesText => Ok(render_merges_text(rules)),
        }
    }

    /// Parse a rule set from text in this format.
    pub fn parse(self, content: &str) -> Result<RuleSet> {
        match self {
            Self::Json => serde_json::from_str(content)
                .map_err(|e| BpeError::MalformedRuleData(e.to_string())),
            Self::MergesText => parse_merges_text(content),
        }
    }
}

fn render_merges_text(rules: &RuleSet) -> String {
    let mut out = String::from("#version: subtok\n");
    for rule in rules {
        out.push_str(&format!("{} {}\n", rule.left, rule.right));
    }
    out
}

fn parse_merges_text(content: &str) -> Result<RuleSet> {
    let mut rules = RuleSet::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(BpeError::MalformedRuleData(format!(
                "invalid merge format at line {}: '{}'",
                line_num + 1,
                line
            )));
        }

        rules
            .try_push(MergeRule::new(parts[0], parts[1]))
            .map_err(|e| {
                BpeError::MalformedRuleData(format!("line {}: {}", line_num + 1, e))
            })?;
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RuleSet {
        RuleSet::from_rules([
            MergeRule::new("t", "h"),
            MergeRule::new("th", "e"),
            MergeRule::new("a", "a"),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_path() {
        assert_eq!(RuleFormat::from_path(Path::new("merges.txt")), RuleFormat::MergesText);
        assert_eq!(RuleFormat::from_path(Path::new("rules.JSON")), RuleFormat::Json);
        assert_eq!(RuleFormat::from_path(Path::new("rules")), RuleFormat::Json);
    }

    #[test]
    fn test_json_keeps_order() {
        let json = RuleFormat::Json.render(&sample()).unwrap();
        let th = json.find("\"t_h\"").unwrap();
        let the = json.find("\"th_e\"").unwrap();
        let aa = json.find("\"a_a\"").unwrap();
        assert!(th < the && the < aa);

        assert_eq!(RuleFormat::Json.parse(&json).unwrap(), sample());
    }

    #[test]
    fn test_json_accepts_plain_mapping() {
        let rules = RuleFormat::Json
            .parse(r#"{"a_a": "aa", "aa_b": "aab"}"#)
            .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.get(0).unwrap().merged, "aa");
        assert_eq!(rules.get(1).unwrap().merged, "aab");
    }

    #[test]
    fn test_merges_text() {
        let text = RuleFormat::MergesText.render(&sample()).unwrap();
        assert_eq!(text, "#version: subtok\nt h\nth e\na a\n");
        assert_eq!(RuleFormat::MergesText.parse(&text).unwrap(), sample());
    }

    #[test]
    fn test_malformed_inputs() {
        for bad in ["", "{", "[]", r#"{"ab": "ab"}"#, r#"{"a_b": "xx"}"#] {
            let err = RuleFormat::Json.parse(bad).unwrap_err();
            assert!(err.is_malformed(), "{:?} -> {}", bad, err);
        }

        let err = RuleFormat::MergesText.parse("a b\nc\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let err = RuleFormat::MergesText.parse("a b\na b\n").unwrap_err();
        assert!(err.is_malformed());
    }
}

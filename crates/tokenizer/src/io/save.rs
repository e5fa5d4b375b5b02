//! Save functionality for trained rule sets.

use super::format::RuleFormat;
use log::info;
use std::fs;
use std::path::Path;
use subtok_core::{BpeError, Result, RuleSet};

/// Rule set saver - writes a rule set to disk.
pub struct RuleSaver<'a> {
    /// Rules to persist
    rules: &'a RuleSet,
    /// Output format
    format: RuleFormat,
}

impl<'a> RuleSaver<'a> {
    /// Create a new saver writing JSON.
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            format: RuleFormat::Json,
        }
    }

    /// Use the given format instead of JSON.
    pub fn with_format(mut self, format: RuleFormat) -> Self {
        self.format = format;
        self
    }

    /// Save the rule set to `path`, creating parent directories.
    ///
    /// Fails with [`BpeError::IoUnavailable`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BpeError::io(parent, e))?;
        }

        let content = self.format.render(self.rules)?;
        fs::write(path, content).map_err(|e| BpeError::io(path, e))?;

        info!(
            "saved {} merge rules to {} ({:?})",
            self.rules.len(),
            path.display(),
            self.format
        );
        Ok(())
    }
}

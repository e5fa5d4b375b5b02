//! Case normalization for pre-tokenization.

use std::borrow::Cow;

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    /// Full lowercase mapping
    #[default]
    Lowercase,
    /// No normalization
    None,
}

/// Text normalizer applied before word extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Normalization form to apply
    form: NormalizationForm,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(form: NormalizationForm) -> Self {
        Self { form }
    }

    /// Create a lowercasing normalizer (default).
    pub fn lowercase() -> Self {
        Self::new(NormalizationForm::Lowercase)
    }

    /// Normalize text, borrowing when nothing changes.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.form {
            NormalizationForm::Lowercase if text.chars().any(char::is_uppercase) => {
                Cow::Owned(text.to_lowercase())
            }
            _ => Cow::Borrowed(text),
        }
    }

    /// Check if normalization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.form != NormalizationForm::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase() {
        let normalizer = Normalizer::lowercase();
        assert_eq!(normalizer.normalize("Hello WORLD"), "hello world");
    }

    #[test]
    fn test_borrows_when_unchanged() {
        let normalizer = Normalizer::lowercase();
        assert!(matches!(normalizer.normalize("already low"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_no_normalization() {
        let normalizer = Normalizer::new(NormalizationForm::None);
        assert_eq!(normalizer.normalize("Hello"), "Hello");
        assert!(!normalizer.is_enabled());
        assert!(Normalizer::default().is_enabled());
    }
}

//! Highlight words and their validation.
//!
//! ## Learning: Parse, Don't Validate
//!
//! A [`Word`] can only be built through [`Word::new`], so any `Word` value
//! is known to be valid. Code downstream never re-checks.

use serde::{Deserialize, Serialize};

/// Why a candidate string is not a highlight word.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidWordError {
    #[error("Word is empty")]
    Empty,

    #[error("Word {0:?} contains whitespace")]
    Whitespace(String),
}

/// Returns true if `candidate` is non-empty and free of whitespace.
///
/// A string without whitespace is also its own trimmed form, so padded
/// candidates are rejected too.
pub fn is_valid_word(candidate: &str) -> bool {
    validate(candidate).is_ok()
}

fn validate(candidate: &str) -> Result<(), InvalidWordError> {
    if candidate.is_empty() {
        return Err(InvalidWordError::Empty);
    }
    if candidate.chars().any(char::is_whitespace) {
        return Err(InvalidWordError::Whitespace(candidate.to_string()));
    }
    Ok(())
}

/// A validated highlight word. Compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word(String);

impl Word {
    /// Validates `candidate` and wraps it.
    pub fn new(candidate: impl Into<String>) -> Result<Self, InvalidWordError> {
        let candidate = candidate.into();
        validate(&candidate)?;
        Ok(Self(candidate))
    }

    /// Returns the word text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Word {
    type Error = InvalidWordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Word::new(value)
    }
}

impl TryFrom<&str> for Word {
    type Error = InvalidWordError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Word::new(value)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Word {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Word {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_words() {
        assert!(is_valid_word("foo"));
        assert!(is_valid_word("0"));
        assert!(is_valid_word("foo_bar"));
        assert!(is_valid_word("a.b"));
    }

    #[test]
    fn test_invalid_words() {
        assert_eq!(Word::new(""), Err(InvalidWordError::Empty));
        assert!(matches!(Word::new(" foo"), Err(InvalidWordError::Whitespace(_))));
        assert!(matches!(Word::new("foo\n"), Err(InvalidWordError::Whitespace(_))));
        assert!(matches!(Word::new("foo bar"), Err(InvalidWordError::Whitespace(_))));
        assert!(!is_valid_word("a\tb"));
    }

    #[test]
    fn test_serde_rejects_invalid_words() {
        let words: Vec<Word> = serde_json::from_str(r#"["foo","bar"]"#).unwrap();
        assert_eq!(words, vec![Word::new("foo").unwrap(), Word::new("bar").unwrap()]);
        assert!(serde_json::from_str::<Vec<Word>>(r#"["foo bar"]"#).is_err());
    }

    proptest! {
        #[test]
        fn prop_invalid_iff_empty_padded_or_spaced(candidate in "\\PC{0,6}|[ \\t]?[a-z]{0,4}[ \\t]?[a-z]{0,4}") {
            let expected_invalid = candidate.is_empty()
                || candidate.trim() != candidate
                || candidate.chars().any(char::is_whitespace);
            prop_assert_eq!(Word::new(candidate.as_str()).is_err(), expected_invalid);
        }
    }
}

//! Whole-word, case-sensitive text search over snapshots.

use crate::{Snapshot, Span};

/// Errors a search backend can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Search unavailable: {0}")]
    Unavailable(String),

    #[error("Empty search pattern")]
    EmptyPattern,
}

/// A read-only text search capability.
///
/// Implementations must return spans sorted by start offset and pairwise
/// non-overlapping, all expressed against `snapshot`.
pub trait TextSearch: Send + Sync {
    /// Finds every whole-word, case-sensitive occurrence of `word`.
    fn find_all(&self, word: &str, snapshot: &Snapshot) -> Result<Vec<Span>, SearchError>;
}

/// Returns true for characters that make up words: letters, digits and `_`.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The default search: exact substring matches bounded by non-word
/// characters or the ends of the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeWordSearch;

impl TextSearch for WholeWordSearch {
    fn find_all(&self, word: &str, snapshot: &Snapshot) -> Result<Vec<Span>, SearchError> {
        if word.is_empty() {
            return Err(SearchError::EmptyPattern);
        }

        let text = snapshot.text();
        let word_chars = word.chars().count();
        let mut spans = Vec::new();
        let mut from = 0;

        while let Some(found) = text[from..].find(word) {
            let start = from + found;
            let end = start + word.len();

            let bounded_before = !matches!(text[..start].chars().next_back(), Some(c) if is_word_char(c));
            let bounded_after = !matches!(text[end..].chars().next(), Some(c) if is_word_char(c));

            if bounded_before && bounded_after {
                spans.push(Span::with_len(snapshot.byte_to_char(start), word_chars));
                from = end;
            } else {
                // A rejected candidate may still hide an overlapping match
                from = start + text[start..].chars().next().map_or(1, char::len_utf8);
            }
        }

        Ok(spans)
    }
}

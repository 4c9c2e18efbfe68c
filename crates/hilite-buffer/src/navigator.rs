//! Word extents under a point.
//!
//! ## Learning: Unicode Word Boundaries
//!
//! Splitting on whitespace is wrong for most text: `foo(bar)` holds two
//! words and `naïve` is one. `unicode-segmentation` implements the UAX #29
//! word boundary rules, which we apply one line at a time.

use unicode_segmentation::UnicodeSegmentation;

use crate::search::is_word_char;
use crate::{Snapshot, Span};

/// The extent of the token under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
    /// The token's span
    pub span: Span,
    /// False for whitespace and pure punctuation
    pub is_significant: bool,
}

impl TextExtent {
    /// An insignificant, zero-width extent.
    pub fn empty(at: usize) -> Self {
        Self {
            span: Span::empty(at),
            is_significant: false,
        }
    }
}

/// A structural tokenizer that can report the token under a point.
pub trait WordNavigator: Send + Sync {
    /// Returns the extent of the token containing `offset`.
    ///
    /// Offsets at the end of a line (or of the text) yield an empty,
    /// insignificant extent starting at `offset`.
    fn extent_of_word(&self, snapshot: &Snapshot, offset: usize) -> TextExtent;
}

/// A navigator following Unicode word boundaries within a line.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWordNavigator;

impl WordNavigator for UnicodeWordNavigator {
    fn extent_of_word(&self, snapshot: &Snapshot, offset: usize) -> TextExtent {
        let Ok(line) = snapshot.line_span(offset) else {
            return TextExtent::empty(offset);
        };
        let Ok(text) = snapshot.slice(line) else {
            return TextExtent::empty(offset);
        };

        let relative = offset - line.start;
        let mut seen = 0;
        for segment in text.split_word_bounds() {
            let len = segment.chars().count();
            if relative < seen + len {
                return TextExtent {
                    span: Span::with_len(line.start + seen, len),
                    is_significant: segment.chars().any(is_word_char),
                };
            }
            seen += len;
        }

        TextExtent::empty(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextBuffer;

    fn extent(text: &str, offset: usize) -> (String, bool) {
        let snapshot = TextBuffer::from(text).snapshot();
        let extent = UnicodeWordNavigator.extent_of_word(&snapshot, offset);
        (
            snapshot.slice(extent.span).unwrap().into_owned(),
            extent.is_significant,
        )
    }

    #[test]
    fn test_word_under_point() {
        assert_eq!(extent("let foo_bar = 1;", 5), ("foo_bar".to_string(), true));
        assert_eq!(extent("let foo_bar = 1;", 4), ("foo_bar".to_string(), true));
    }

    #[test]
    fn test_whitespace_and_punctuation_are_insignificant() {
        assert_eq!(extent("a  b", 1), ("  ".to_string(), false));
        assert_eq!(extent("f(x)", 1), ("(".to_string(), false));
    }

    #[test]
    fn test_end_of_line_is_empty() {
        let snapshot = TextBuffer::from("foo\nbar").snapshot();
        let extent = UnicodeWordNavigator.extent_of_word(&snapshot, 3);
        assert_eq!(extent, TextExtent::empty(3));

        let extent = UnicodeWordNavigator.extent_of_word(&snapshot, 7);
        assert_eq!(extent, TextExtent::empty(7));
    }
}

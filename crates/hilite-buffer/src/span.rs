//! Half-open character ranges.
//!
//! ## Learning: Range Types
//!
//! Rust's standard library has `Range<T>` (exclusive end) and
//! `RangeInclusive<T>` (inclusive end). Spans use exclusive ends because:
//! - Empty spans (start == end) are natural
//! - Easier arithmetic (length = end - start)
//! - Consistent with slice semantics
//!
//! A `Span` carries no snapshot of its own. It is only meaningful against
//! the snapshot it was computed on; see [`crate::Snapshot::translate_span`].

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A half-open range `[start, end)` of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    ///
    /// Automatically normalizes so start <= end.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a span starting at `start` covering `len` characters.
    pub fn with_len(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    /// Creates a zero-width span.
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// Returns the number of characters covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if this span shares at least one character with another.
    ///
    /// Empty spans overlap nothing.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns the span as a `Range`.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Returns true if spans are sorted by start and pairwise non-overlapping.
pub fn is_normalized(spans: &[Span]) -> bool {
    spans.windows(2).all(|pair| pair[0].end <= pair[1].start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_normalization() {
        let span = Span::new(15, 10);
        assert_eq!(span, Span::new(10, 15));
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn test_span_overlap() {
        let a = Span::new(0, 10);
        let b = Span::new(5, 15);
        let c = Span::new(10, 12);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!Span::empty(5).overlaps(&a));
    }

    #[test]
    fn test_is_normalized() {
        assert!(is_normalized(&[Span::new(0, 3), Span::new(3, 6)]));
        assert!(!is_normalized(&[Span::new(0, 4), Span::new(3, 6)]));
        assert!(!is_normalized(&[Span::new(5, 6), Span::new(0, 1)]));
    }
}

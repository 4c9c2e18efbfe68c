//! Caret and position types.
//!
//! ## Learning: Newtype Pattern
//!
//! `Position` wraps line/column coordinates for user-facing output, while
//! [`Caret`] stores a plain character offset. Keeping them as distinct types
//! means a column can never be passed where an offset is expected.

use serde::{Deserialize, Serialize};

/// A position in the text buffer (line and column).
///
/// Both line and column are 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters not bytes)
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.line.cmp(&other.line) {
            std::cmp::Ordering::Equal => self.column.cmp(&other.column),
            other => other,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display as 1-indexed for user-facing output
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// The single caret of a document view, as a character offset.
///
/// The caret sits *between* characters: offset `n` is just before the
/// character at index `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caret {
    offset: usize,
}

impl Caret {
    /// Creates a caret at an offset.
    pub fn new(offset: usize) -> Self {
        Self { offset }
    }

    /// Returns the caret offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Moves the caret, clamping to `len`.
    pub fn move_to(&mut self, offset: usize, len: usize) {
        self.offset = offset.min(len);
    }

    /// Moves the caret left by `n` characters.
    pub fn move_left(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        let p1 = Position::new(1, 5);
        let p2 = Position::new(2, 3);
        let p3 = Position::new(1, 10);

        assert!(p1 < p2);
        assert!(p1 < p3);
        assert!(p2 > p3);
        assert_eq!(p1.to_string(), "2:6");
    }

    #[test]
    fn test_caret_clamps() {
        let mut caret = Caret::new(3);
        caret.move_left(5);
        assert_eq!(caret.offset(), 0);

        caret.move_to(4, 10);
        assert_eq!(caret.offset(), 4);

        caret.move_to(99, 7);
        assert_eq!(caret.offset(), 7);
    }
}

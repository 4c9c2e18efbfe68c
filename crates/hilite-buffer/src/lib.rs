//! # Hilite Buffer
//!
//! Versioned text buffer, snapshots and search primitives.
//!
//! ## Key Concepts
//!
//! ### Snapshots
//! - `TextBuffer` owns the latest text and hands out immutable [`Snapshot`]s
//! - Every edit links a new snapshot after the previous one
//! - Spans computed on an old snapshot are moved forward with
//!   [`Snapshot::translate_span`]
//!
//! ### Search
//! - [`TextSearch`] finds whole-word matches in a snapshot
//! - [`WordNavigator`] reports the token under a point

mod buffer;
mod cursor;
mod navigator;
mod search;
mod snapshot;
mod span;

pub use buffer::TextBuffer;
pub use cursor::{Caret, Position};
pub use navigator::{TextExtent, UnicodeWordNavigator, WordNavigator};
pub use search::{SearchError, TextSearch, WholeWordSearch, is_word_char};
pub use snapshot::{BufferId, Snapshot, SnapshotError, TextChange, TrackingMode};
pub use span::{Span, is_normalized};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_chars(), 0);
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("Hello, World!");
        assert_eq!(buffer.len_chars(), 13);
        assert_eq!(buffer.text(), "Hello, World!");
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "Hello").unwrap();
        assert_eq!(buffer.text(), "Hello");

        buffer.insert(5, ", World!").unwrap();
        assert_eq!(buffer.text(), "Hello, World!");

        assert_eq!(buffer.delete(5..7).unwrap(), ", ");
        assert_eq!(buffer.text(), "HelloWorld!");
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_every_edit_is_a_new_version() {
        let mut buffer = TextBuffer::from("abc");
        let before = buffer.snapshot();

        buffer.replace(0..1, "xy").unwrap();
        let after = buffer.snapshot();

        assert_eq!(before.version() + 1, after.version());
        assert_eq!(before.text(), "abc");
        assert_eq!(after.text(), "xybc");
        assert_eq!(
            before.changes_to(&after).unwrap(),
            vec![TextChange::replace(Span::new(0, 1), 2)]
        );
    }

    #[test]
    fn test_empty_edits_keep_the_version() {
        let mut buffer = TextBuffer::from("abc");
        buffer.insert(1, "").unwrap();
        buffer.delete(2..2).unwrap();
        assert_eq!(buffer.snapshot().version(), 0);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_out_of_range_edits_fail() {
        let mut buffer = TextBuffer::from("abc");
        assert!(matches!(
            buffer.insert(4, "x"),
            Err(BufferError::InvalidCharIndex(4))
        ));
        assert!(buffer.delete(1..9).is_err());
    }

    #[test]
    fn test_position_conversion() {
        let buffer = TextBuffer::from("Line 1\nLine 2\nLine 3");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.char_idx_to_position(9).unwrap(), Position::new(1, 2));
        assert_eq!(buffer.position_to_char_idx(Position::new(2, 0)).unwrap(), 14);
    }
}

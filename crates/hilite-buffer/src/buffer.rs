//! Core text buffer implementation using rope data structure.
//!
//! ## Why Rope?
//!
//! Ropes make snapshots nearly free: cloning a `ropey::Rope` shares all of
//! its nodes, so every edit can hand out a new immutable [`Snapshot`] while
//! older snapshots keep reading the text they were taken from.
//!
//! ## Learning: Ownership in Action
//!
//! ```rust,ignore
//! let mut buffer = TextBuffer::new();  // buffer OWNS the current version
//! let before = buffer.snapshot();      // before is an independent value
//! buffer.insert(0, "x")?;              // OK! nothing borrows the buffer
//! assert_ne!(before.version(), buffer.snapshot().version());
//! ```

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::snapshot::{BufferId, Snapshot, TextChange};
use crate::{BufferError, BufferResult, Position, Span};

/// A text buffer that records every edit as a new [`Snapshot`].
///
/// # Thread Safety
///
/// `TextBuffer` is `Send` but mutation requires `&mut self`. Share
/// [`Snapshot`]s with other threads instead of the buffer itself.
#[derive(Debug)]
pub struct TextBuffer {
    /// The latest version of the text
    current: Snapshot,

    /// Whether the buffer has unsaved changes
    modified: bool,

    /// Associated file path (if any)
    file_path: Option<PathBuf>,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use hilite_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// assert_eq!(buffer.snapshot().version(), 0);
    /// ```
    pub fn new() -> Self {
        Self::from_rope(Rope::new())
    }

    fn from_rope(rope: Rope) -> Self {
        Self {
            current: Snapshot::initial(BufferId::new(), rope),
            modified: false,
            file_path: None,
        }
    }

    /// Loads a buffer from a file.
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let mut buffer = Self::from_rope(Rope::from_str(&content));
        buffer.file_path = Some(path.to_path_buf());
        Ok(buffer)
    }

    // ==================== Snapshots ====================

    /// Returns the buffer's identity.
    pub fn id(&self) -> BufferId {
        self.current.buffer_id()
    }

    /// Returns an immutable view of the current text.
    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.current.text()
    }

    /// Returns a slice of text by character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<Cow<'_, str>> {
        self.current.slice(Span::from(range))
    }

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Returns the number of characters in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.current.len_chars()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope().len_lines()
    }

    fn rope(&self) -> &Rope {
        self.current.rope()
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<()> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        if text.is_empty() {
            return Ok(());
        }

        let mut rope = self.rope().clone();
        rope.insert(char_idx, text);
        self.commit(TextChange::insert(char_idx, text.chars().count()), rope)
    }

    /// Deletes text in a character range, returning it.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<String> {
        self.replace(range, "")
    }

    /// Replaces text in a range with new text as a single change.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferResult<String> {
        let span = Span::from(range);
        if span.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(span.end));
        }
        if span.is_empty() && text.is_empty() {
            return Ok(String::new());
        }

        let removed: String = self.rope().slice(span.range()).into();
        let mut rope = self.rope().clone();
        rope.remove(span.range());
        rope.insert(span.start, text);
        self.commit(TextChange::replace(span, text.chars().count()), rope)?;

        Ok(removed)
    }

    /// Links a new snapshot after the current one.
    fn commit(&mut self, change: TextChange, rope: Rope) -> BufferResult<()> {
        self.current = self.current.successor(change, rope)?;
        self.modified = true;
        Ok(())
    }

    // ==================== Position Conversion ====================

    /// Converts a Position (line, column) to a character index.
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        if pos.line >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        let line_start = self.rope().line_to_char(pos.line);
        let line_len = self.rope().line(pos.line).len_chars();

        // Allow column to be at end of line (for insertion)
        if pos.column > line_len {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        Ok(line_start + pos.column)
    }

    /// Converts a character index to a Position (line, column).
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let line = self.rope().char_to_line(char_idx);
        let line_start = self.rope().line_to_char(line);

        Ok(Position {
            line,
            column: char_idx - line_start,
        })
    }

    // ==================== State Queries ====================

    /// Returns true if the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Returns the associated file path, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self::from_rope(Rope::from_str(s))
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

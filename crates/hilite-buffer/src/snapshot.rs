//! Immutable, versioned views of buffer text.
//!
//! ## Learning: Persistent Version Chains
//!
//! Every edit to a [`crate::TextBuffer`] produces a new [`Snapshot`]. Each
//! version points *forward* to its successor through a `OnceLock`, recording
//! the [`TextChange`] that produced it. Holding an old snapshot therefore
//! keeps the changes needed to reach any newer one alive, while dropping old
//! snapshots releases history nobody can ask for anymore.
//!
//! ```text
//! v0 ──change──▶ v1 ──change──▶ v2 ──change──▶ v3 (current)
//! ```
//!
//! Cloning a `Snapshot` is cheap: the rope shares its nodes and the version
//! node sits behind an `Arc`.

use ropey::Rope;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

use crate::{BufferError, BufferResult, Span};

/// Identity of one text buffer; shared by all of its snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferId(Uuid);

impl BufferId {
    /// Creates a new unique buffer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BufferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised when moving data between snapshots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshots belong to different buffers")]
    ForeignBuffer,

    #[error("Cannot translate from version {from} back to older version {to}")]
    OlderTarget { from: u64, to: u64 },

    #[error("Version {0} already has a successor")]
    Diverged(u64),

    #[error("Version {0} is not reachable from this snapshot")]
    Unreachable(u64),
}

/// How a point behaves when text is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    /// The point moves to the end of the inserted text.
    Positive,
    /// The point stays before the inserted text.
    Negative,
}

/// A single replacement of `old_len` characters at `position` with
/// `new_len` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChange {
    /// Character offset where the change starts
    pub position: usize,
    /// Characters removed
    pub old_len: usize,
    /// Characters inserted
    pub new_len: usize,
}

impl TextChange {
    /// A pure insertion.
    pub fn insert(position: usize, new_len: usize) -> Self {
        Self {
            position,
            old_len: 0,
            new_len,
        }
    }

    /// A pure deletion of `span`.
    pub fn delete(span: Span) -> Self {
        Self {
            position: span.start,
            old_len: span.len(),
            new_len: 0,
        }
    }

    /// A replacement of `span` with `new_len` characters.
    pub fn replace(span: Span, new_len: usize) -> Self {
        Self {
            position: span.start,
            old_len: span.len(),
            new_len,
        }
    }

    /// End of the removed range in the old text.
    pub fn old_end(&self) -> usize {
        self.position + self.old_len
    }

    /// Maps an offset in the text before this change to the text after it.
    ///
    /// Offsets before the change are untouched and offsets after the removed
    /// range shift by the length difference. Offsets at the change position
    /// or inside the removed range collapse onto the replacement, choosing
    /// its start or end according to `mode`.
    pub fn map_offset(&self, offset: usize, mode: TrackingMode) -> usize {
        if offset < self.position {
            return offset;
        }

        let old_end = self.old_end();
        if offset > old_end || (offset == old_end && self.old_len > 0) {
            return offset - self.old_len + self.new_len;
        }

        match mode {
            TrackingMode::Positive => self.position + self.new_len,
            TrackingMode::Negative => self.position,
        }
    }

    /// Maps a span edge-exclusively: text inserted at either boundary stays
    /// outside the span.
    pub fn map_span(&self, span: Span) -> Span {
        let start = self.map_offset(span.start, TrackingMode::Positive);
        let end = self.map_offset(span.end, TrackingMode::Negative);
        Span {
            start,
            end: end.max(start),
        }
    }
}

#[derive(Debug)]
struct Version {
    number: u64,
    next: OnceLock<Arc<Successor>>,
}

#[derive(Debug)]
struct Successor {
    change: TextChange,
    version: Arc<Version>,
}

impl Drop for Version {
    fn drop(&mut self) {
        // Unlink iteratively; dropping a long history would otherwise
        // recurse once per version.
        let mut next = self.next.take();
        while let Some(link) = next {
            let Ok(link) = Arc::try_unwrap(link) else { break };
            let Ok(mut version) = Arc::try_unwrap(link.version) else { break };
            next = version.next.take();
        }
    }
}

/// An immutable view of a buffer's text at one version.
#[derive(Clone)]
pub struct Snapshot {
    buffer: BufferId,
    rope: Rope,
    version: Arc<Version>,
    // Contiguous copy of `rope`, built on first use and shared by clones
    flat: Arc<OnceLock<String>>,
}

impl Snapshot {
    /// Creates the first snapshot of a buffer.
    pub(crate) fn initial(buffer: BufferId, rope: Rope) -> Self {
        Self {
            buffer,
            rope,
            version: Arc::new(Version {
                number: 0,
                next: OnceLock::new(),
            }),
            flat: Arc::default(),
        }
    }

    /// Links a successor produced by `change` and returns it.
    pub(crate) fn successor(&self, change: TextChange, rope: Rope) -> Result<Self, SnapshotError> {
        let version = Arc::new(Version {
            number: self.version.number + 1,
            next: OnceLock::new(),
        });
        self.version
            .next
            .set(Arc::new(Successor {
                change,
                version: Arc::clone(&version),
            }))
            .map_err(|_| SnapshotError::Diverged(self.version.number))?;

        Ok(Self {
            buffer: self.buffer,
            rope,
            version,
            flat: Arc::default(),
        })
    }

    // ==================== Identity ====================

    /// Returns the owning buffer's ID.
    pub fn buffer_id(&self) -> BufferId {
        self.buffer
    }

    /// Returns the version number; higher is newer.
    pub fn version(&self) -> u64 {
        self.version.number
    }

    /// Returns true if both snapshots are the same version of the same buffer.
    pub fn same_version(&self, other: &Snapshot) -> bool {
        self.buffer == other.buffer && self.version.number == other.version.number
    }

    // ==================== Text Access ====================

    /// Returns the entire text.
    ///
    /// A rope spanning several chunks is copied out once per snapshot; later
    /// calls, on this snapshot or any clone of it, borrow that copy.
    pub fn text(&self) -> Cow<'_, str> {
        if let Some(text) = self.rope.slice(..).as_str() {
            return Cow::Borrowed(text);
        }
        Cow::Borrowed(self.flat.get_or_init(|| self.rope.to_string()))
    }

    /// Returns the text covered by a span.
    pub fn slice(&self, span: Span) -> BufferResult<Cow<'_, str>> {
        if span.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(span.end));
        }
        Ok(self.rope.slice(span.range()).into())
    }

    /// Returns the character at an offset, if any.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.len_chars()).then(|| self.rope.char(offset))
    }

    /// Returns the number of characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns true if the snapshot holds no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns a span covering the whole snapshot.
    pub fn full_span(&self) -> Span {
        Span::new(0, self.len_chars())
    }

    /// Returns the span of the line containing `offset`, without its line
    /// break.
    pub fn line_span(&self, offset: usize) -> BufferResult<Span> {
        if offset > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(offset));
        }

        let line = self.rope.char_to_line(offset);
        let start = self.rope.line_to_char(line);
        let mut end = start + self.rope.line(line).len_chars();

        // Exclude "\n", "\r\n" and a lone "\r"
        if end > start && self.rope.char(end - 1) == '\n' {
            end -= 1;
        }
        if end > start && self.rope.char(end - 1) == '\r' {
            end -= 1;
        }

        Ok(Span::new(start, end))
    }

    /// Converts a byte index into a character offset.
    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        self.rope.byte_to_char(byte_idx)
    }

    pub(crate) fn rope(&self) -> &Rope {
        &self.rope
    }

    // ==================== Translation ====================

    /// Collects the changes leading from this snapshot to `target`.
    pub fn changes_to(&self, target: &Snapshot) -> Result<Vec<TextChange>, SnapshotError> {
        if self.buffer != target.buffer {
            return Err(SnapshotError::ForeignBuffer);
        }
        if target.version() < self.version() {
            return Err(SnapshotError::OlderTarget {
                from: self.version(),
                to: target.version(),
            });
        }

        let mut changes = Vec::new();
        let mut current = Arc::clone(&self.version);
        while current.number < target.version() {
            let successor = current
                .next
                .get()
                .cloned()
                .ok_or(SnapshotError::Unreachable(target.version()))?;
            changes.push(successor.change);
            current = Arc::clone(&successor.version);
        }

        Ok(changes)
    }

    /// Translates an offset on this snapshot to `target`.
    pub fn translate_offset(
        &self,
        offset: usize,
        target: &Snapshot,
        mode: TrackingMode,
    ) -> Result<usize, SnapshotError> {
        Ok(self
            .changes_to(target)?
            .iter()
            .fold(offset, |offset, change| change.map_offset(offset, mode)))
    }

    /// Translates a span on this snapshot to `target`, edge-exclusively.
    pub fn translate_span(&self, span: Span, target: &Snapshot) -> Result<Span, SnapshotError> {
        Ok(self
            .changes_to(target)?
            .iter()
            .fold(span, |span, change| change.map_span(span)))
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("buffer", &self.buffer)
            .field("version", &self.version.number)
            .field("len_chars", &self.rope.len_chars())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextBuffer;
    use proptest::prelude::*;

    #[test]
    fn test_insert_before_span_shifts_it() {
        let mut buffer = TextBuffer::from("0123456789abcdefghij");
        let s1 = buffer.snapshot();
        buffer.insert(5, "xyz").unwrap();
        let s2 = buffer.snapshot();

        assert_eq!(s1.translate_span(Span::new(10, 15), &s2), Ok(Span::new(13, 18)));
    }

    #[test]
    fn test_boundary_insertions_are_not_absorbed() {
        let mut buffer = TextBuffer::from("0123456789abcdefghij");
        let s1 = buffer.snapshot();
        buffer.insert(10, "xyz").unwrap();
        let s2 = buffer.snapshot();
        assert_eq!(s1.translate_span(Span::new(10, 15), &s2), Ok(Span::new(13, 18)));

        buffer.insert(18, "!!").unwrap();
        let s3 = buffer.snapshot();
        assert_eq!(s1.translate_span(Span::new(10, 15), &s3), Ok(Span::new(13, 18)));
    }

    #[test]
    fn test_interior_insertion_grows_span() {
        let mut buffer = TextBuffer::from("hello world");
        let s1 = buffer.snapshot();
        buffer.insert(8, "__").unwrap();
        let s2 = buffer.snapshot();

        assert_eq!(s1.translate_span(Span::new(6, 11), &s2), Ok(Span::new(6, 13)));
    }

    #[test]
    fn test_deleting_span_collapses_it() {
        let mut buffer = TextBuffer::from("foo bar baz");
        let s1 = buffer.snapshot();
        buffer.delete(2..9).unwrap();
        let s2 = buffer.snapshot();

        let translated = s1.translate_span(Span::new(4, 7), &s2).unwrap();
        assert!(translated.is_empty());
        assert_eq!(translated.start, 2);
    }

    #[test]
    fn test_translation_errors() {
        let mut buffer = TextBuffer::from("abc");
        let s1 = buffer.snapshot();
        buffer.insert(0, "x").unwrap();
        let s2 = buffer.snapshot();
        let other = TextBuffer::from("abc").snapshot();

        assert_eq!(
            s2.translate_span(Span::new(0, 1), &s1),
            Err(SnapshotError::OlderTarget { from: 1, to: 0 })
        );
        assert_eq!(
            s1.translate_span(Span::new(0, 1), &other),
            Err(SnapshotError::ForeignBuffer)
        );
    }

    #[test]
    fn test_same_version_translation_is_identity() {
        let buffer = TextBuffer::from("abc");
        let s1 = buffer.snapshot();
        assert_eq!(s1.translate_span(Span::new(1, 2), &s1), Ok(Span::new(1, 2)));
        assert!(s1.same_version(&buffer.snapshot()));
    }

    #[test]
    fn test_large_text_is_copied_once() {
        let text = "lorem ipsum dolor sit amet\n".repeat(2000);
        let mut buffer = TextBuffer::from(text.as_str());
        let snapshot = buffer.snapshot();
        let clone = snapshot.clone();

        let first = snapshot.text();
        assert_eq!(first, text.as_str());
        assert!(matches!(first, Cow::Borrowed(_)));
        assert_eq!(first.as_ptr(), snapshot.text().as_ptr());
        assert_eq!(first.as_ptr(), clone.text().as_ptr());

        buffer.insert(0, "x").unwrap();
        let edited = buffer.snapshot();
        assert_eq!(edited.text().len(), text.len() + 1);
        assert_ne!(edited.text().as_ptr(), first.as_ptr());
    }

    #[test]
    fn test_line_span_excludes_line_break() {
        let buffer = TextBuffer::from("ab\r\ncd\nef");
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.line_span(1).unwrap(), Span::new(0, 2));
        assert_eq!(snapshot.line_span(4).unwrap(), Span::new(4, 6));
        assert_eq!(snapshot.line_span(9).unwrap(), Span::new(7, 9));
    }

    proptest! {
        #[test]
        fn prop_translated_text_is_preserved_by_unrelated_edits(
            prefix in "[a-z ]{0,20}",
            word in "[a-z]{1,8}",
            suffix in "[a-z ]{0,20}",
            insert in "[A-Z]{1,5}",
            before in any::<bool>(),
        ) {
            let text = format!("{prefix}{word}{suffix}");
            let span = Span::with_len(prefix.chars().count(), word.chars().count());
            let mut buffer = TextBuffer::from(text.as_str());
            let s1 = buffer.snapshot();

            let at = if before { 0 } else { buffer.len_chars() };
            buffer.insert(at, &insert).unwrap();
            let s2 = buffer.snapshot();

            let moved = s1.translate_span(span, &s2).unwrap();
            prop_assert_eq!(s2.slice(moved).unwrap(), word.as_str());
        }
    }
}

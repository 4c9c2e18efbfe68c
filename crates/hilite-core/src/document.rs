//! Document management.
//!
//! ## Learning: Type Aliases and Newtypes
//!
//! `DocumentId` is a newtype wrapper around `Uuid`. This provides:
//! - Type safety: Can't accidentally use a buffer id as a document ID
//! - Encapsulation: Can change the underlying type without breaking APIs
//! - Documentation: The type name explains its purpose

use hilite_buffer::{Caret, Position, Snapshot, TextBuffer, TextSearch};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::event::{EventBus, HighlightEvent};
use crate::store::WordListStore;
use crate::tagger::HighlightTagger;
use crate::{CoreError, CoreResult};

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new unique document ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An open document: a buffer, its caret and its highlight tagger.
///
/// ## Learning: Composition over Inheritance
///
/// `Document` composes a `TextBuffer` and a `HighlightTagger`. Every edit
/// goes through the document, which hands the new snapshot to the tagger
/// and announces it on the event bus.
pub struct Document {
    /// Unique identifier
    id: DocumentId,

    /// The underlying text buffer
    buffer: TextBuffer,

    /// Single caret
    caret: Caret,

    /// File path (None for untitled documents)
    path: Option<PathBuf>,

    /// Display name
    name: String,

    /// Highlights for this document
    tagger: Arc<HighlightTagger>,

    events: EventBus,
}

impl Document {
    /// Creates a document over `buffer` with the caret at the start.
    pub fn new(
        buffer: TextBuffer,
        name: impl Into<String>,
        store: &Arc<WordListStore>,
        search: Arc<dyn TextSearch>,
    ) -> Self {
        let id = DocumentId::new();
        let path = buffer.file_path().map(Path::to_path_buf);
        let tagger = HighlightTagger::new(id, buffer.snapshot(), 0, Arc::clone(store), search);

        Self {
            id,
            buffer,
            caret: Caret::default(),
            path,
            name: name.into(),
            tagger: Arc::new(tagger),
            events: store.events().clone(),
        }
    }

    /// Opens a document from a file.
    pub fn from_file(
        path: impl AsRef<Path>,
        store: &Arc<WordListStore>,
        search: Arc<dyn TextSearch>,
    ) -> CoreResult<Self> {
        let path = path.as_ref();
        let buffer = TextBuffer::from_file(path)?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();

        Ok(Self::new(buffer, name, store, search))
    }

    /// Returns the document ID.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Returns the text buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.buffer.snapshot()
    }

    /// Returns the document text.
    pub fn text(&self) -> Cow<'_, str> {
        self.buffer.text()
    }

    /// Returns the caret offset.
    pub fn caret(&self) -> usize {
        self.caret.offset()
    }

    /// Returns the caret as a line/column position.
    pub fn caret_position(&self) -> CoreResult<Position> {
        Ok(self.buffer.char_idx_to_position(self.caret.offset())?)
    }

    /// Returns this document's tagger.
    pub fn tagger(&self) -> &Arc<HighlightTagger> {
        &self.tagger
    }

    // ==================== Text Editing ====================

    /// Inserts text at the caret and moves the caret past it.
    pub fn insert_at_caret(&mut self, text: &str) -> CoreResult<()> {
        let idx = self.caret.offset();
        self.buffer.insert(idx, text)?;
        self.caret
            .move_to(idx + text.chars().count(), self.buffer.len_chars());
        self.changed();
        Ok(())
    }

    /// Deletes the character before the caret (backspace).
    pub fn delete_backward(&mut self) -> CoreResult<()> {
        let idx = self.caret.offset();
        if idx > 0 {
            self.buffer.delete(idx - 1..idx)?;
            self.caret.move_left(1);
            self.changed();
        }
        Ok(())
    }

    /// Deletes the character after the caret (delete key).
    pub fn delete_forward(&mut self) -> CoreResult<()> {
        let idx = self.caret.offset();
        if idx < self.buffer.len_chars() {
            self.buffer.delete(idx..idx + 1)?;
            self.changed();
        }
        Ok(())
    }

    /// Replaces a character range and puts the caret after the new text.
    pub fn replace(&mut self, range: std::ops::Range<usize>, text: &str) -> CoreResult<()> {
        let start = range.start;
        self.buffer.replace(range, text)?;
        self.caret
            .move_to(start + text.chars().count(), self.buffer.len_chars());
        self.changed();
        Ok(())
    }

    /// Moves the caret, clamping to the end of the text.
    ///
    /// Caret moves never recompute highlights.
    pub fn move_caret_to(&mut self, offset: usize) {
        self.caret.move_to(offset, self.buffer.len_chars());
        self.tagger.on_caret_moved(self.caret.offset());
    }

    /// Hands the latest snapshot to the tagger and announces it.
    fn changed(&self) {
        let snapshot = self.buffer.snapshot();
        let caret = self.caret.offset();
        self.tagger.on_document_changed(snapshot.clone(), caret);
        self.events.emit(HighlightEvent::DocumentChanged {
            document: self.id,
            snapshot,
            caret,
        });
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("caret", &self.caret)
            .finish()
    }
}

/// Manages multiple open documents.
///
/// ## Learning: HashMap with Custom Keys
///
/// Using `DocumentId` as a HashMap key requires it to implement
/// `Hash` and `Eq`. We derive these automatically.
#[derive(Debug)]
pub struct DocumentManager {
    /// All open documents
    documents: HashMap<DocumentId, Document>,

    /// Order of documents (most recently opened last)
    order: Vec<DocumentId>,

    /// Currently active document
    active: Option<DocumentId>,
}

impl DocumentManager {
    /// Creates a new document manager.
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            order: Vec::new(),
            active: None,
        }
    }

    /// Adds a document and makes it active.
    pub fn add(&mut self, doc: Document) -> DocumentId {
        let id = doc.id();
        self.documents.insert(id, doc);
        self.order.push(id);
        self.active = Some(id);
        id
    }

    /// Removes a document and returns it.
    pub fn close(&mut self, id: DocumentId) -> CoreResult<Document> {
        let doc = self
            .documents
            .remove(&id)
            .ok_or(CoreError::DocumentNotFound(id))?;
        self.order.retain(|&i| i != id);

        if self.active == Some(id) {
            self.active = self.order.last().copied();
        }

        Ok(doc)
    }

    /// Returns a document by ID.
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Returns a mutable document by ID.
    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// Returns the active document.
    pub fn active(&self) -> Option<&Document> {
        self.active.and_then(|id| self.documents.get(&id))
    }

    /// Returns a mutable reference to the active document.
    pub fn active_mut(&mut self) -> Option<&mut Document> {
        self.active.and_then(|id| self.documents.get_mut(&id))
    }

    /// Sets the active document.
    pub fn set_active(&mut self, id: DocumentId) {
        if self.documents.contains_key(&id) {
            self.active = Some(id);
        }
    }

    /// Finds a document by path.
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|(_, doc)| doc.path() == Some(path))
            .map(|(&id, _)| id)
    }

    /// Returns an iterator over all documents.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Returns the document ids in opening order.
    pub fn order(&self) -> &[DocumentId] {
        &self.order
    }

    /// Returns the number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for DocumentManager {
    fn default() -> Self {
        Self::new()
    }
}

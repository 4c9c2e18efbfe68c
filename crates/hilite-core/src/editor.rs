//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade, providing a simple interface to
//! complex subsystems. External code only needs to interact with
//! `Editor`, not with the store, the taggers or the search backends.

use hilite_buffer::{
    Span, TextBuffer, TextSearch, UnicodeWordNavigator, WholeWordSearch, WordNavigator,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::caret_word::resolve_caret_word;
use crate::color::MarkerStyle;
use crate::command::{Command, CommandOutcome};
use crate::config::Config;
use crate::document::{Document, DocumentId, DocumentManager};
use crate::event::{EventBus, HighlightEvent};
use crate::settings::SettingsStore;
use crate::store::WordListStore;
use crate::tagger::Tag;
use crate::word::Word;
use crate::{CoreError, CoreResult};

/// The highlighting editor state.
///
/// ## Thread Safety
///
/// `Editor` is owned by a single thread. It drives its taggers
/// synchronously and mirrors every change on the event bus, so other
/// threads can observe it through [`Editor::subscribe`].
pub struct Editor {
    /// Document management
    documents: DocumentManager,

    /// The shared word list
    store: Arc<WordListStore>,

    /// Match finder used by every tagger
    search: Arc<dyn TextSearch>,

    /// Tokenizer used for the caret word
    navigator: Arc<dyn WordNavigator>,

    /// Editor configuration
    config: Config,

    /// Event bus for notifications
    event_bus: EventBus,
}

impl Editor {
    /// Creates an editor persisting its word list where `config` says.
    pub fn open(config: Config) -> CoreResult<Self> {
        let settings = config.storage.file_settings()?;
        info!("Highlight words stored in {}", settings.path().display());
        Ok(Self::with_settings(config, Arc::new(settings)))
    }

    /// Creates an editor over an explicit settings backend.
    pub fn with_settings(config: Config, settings: Arc<dyn SettingsStore>) -> Self {
        let event_bus = EventBus::new();
        let store = WordListStore::open(settings, config.storage.clone(), event_bus.clone());

        Self {
            documents: DocumentManager::new(),
            store: Arc::new(store),
            search: Arc::new(WholeWordSearch),
            navigator: Arc::new(UnicodeWordNavigator),
            config,
            event_bus,
        }
    }

    /// Replaces the search backend for documents opened afterwards.
    pub fn with_search(mut self, search: Arc<dyn TextSearch>) -> Self {
        self.search = search;
        self
    }

    /// Replaces the caret word tokenizer.
    pub fn with_navigator(mut self, navigator: Arc<dyn WordNavigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the word list store.
    pub fn store(&self) -> &Arc<WordListStore> {
        &self.store
    }

    /// Returns the highlighted words in color order.
    pub fn words(&self) -> Vec<Word> {
        self.store.words()
    }

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> broadcast::Receiver<HighlightEvent> {
        self.event_bus.subscribe()
    }

    // ==================== Document Operations ====================

    /// Opens an untitled document holding `text`.
    pub fn open_text(&mut self, name: impl Into<String>, text: &str) -> DocumentId {
        let doc = Document::new(
            TextBuffer::from(text),
            name,
            &self.store,
            Arc::clone(&self.search),
        );
        self.documents.add(doc)
    }

    /// Opens a file in a new document, or focuses it if already open.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> CoreResult<DocumentId> {
        let path = path.as_ref();

        if let Some(id) = self.documents.find_by_path(path) {
            self.documents.set_active(id);
            return Ok(id);
        }

        let doc = Document::from_file(path, &self.store, Arc::clone(&self.search))?;
        debug!("Opened {}", path.display());
        Ok(self.documents.add(doc))
    }

    /// Closes a document and retires its tagger.
    pub fn close_document(&mut self, id: DocumentId) -> CoreResult<()> {
        self.documents.close(id)?;
        self.event_bus.emit(HighlightEvent::DocumentClosed(id));
        Ok(())
    }

    /// Makes a document the target of editing and commands.
    pub fn focus(&mut self, id: DocumentId) -> CoreResult<()> {
        if self.documents.get(id).is_none() {
            return Err(CoreError::DocumentNotFound(id));
        }
        self.documents.set_active(id);
        Ok(())
    }

    /// Returns the active document.
    pub fn active_document(&self) -> CoreResult<&Document> {
        self.documents.active().ok_or(CoreError::NoActiveDocument)
    }

    fn active_document_mut(&mut self) -> CoreResult<&mut Document> {
        self.documents
            .active_mut()
            .ok_or(CoreError::NoActiveDocument)
    }

    /// Returns a document by ID.
    pub fn document(&self, id: DocumentId) -> CoreResult<&Document> {
        self.documents
            .get(id)
            .ok_or(CoreError::DocumentNotFound(id))
    }

    /// Returns all open documents.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    // ==================== Text Editing ====================

    /// Inserts text at the caret of the active document.
    pub fn insert_text(&mut self, text: &str) -> CoreResult<()> {
        self.active_document_mut()?.insert_at_caret(text)
    }

    /// Deletes the character before the caret.
    pub fn delete_backward(&mut self) -> CoreResult<()> {
        self.active_document_mut()?.delete_backward()
    }

    /// Deletes the character after the caret.
    pub fn delete_forward(&mut self) -> CoreResult<()> {
        self.active_document_mut()?.delete_forward()
    }

    /// Moves the caret of the active document.
    pub fn move_caret_to(&mut self, offset: usize) -> CoreResult<()> {
        self.active_document_mut()?.move_caret_to(offset);
        Ok(())
    }

    // ==================== Commands ====================

    /// Returns the word under the active document's caret.
    pub fn caret_word(&self) -> Option<String> {
        let doc = self.documents.active()?;
        resolve_caret_word(&doc.snapshot(), doc.caret(), self.navigator.as_ref())
    }

    /// Returns the word a toggle command would act on.
    fn applicable_word(&self, command: &Command) -> Option<String> {
        command
            .explicit_word()
            .map(str::to_string)
            .or_else(|| self.caret_word())
    }

    /// Returns true if running `command` now would do something.
    pub fn is_enabled(&self, command: &Command) -> bool {
        match command {
            Command::ToggleWord { .. } => self
                .applicable_word(command)
                .is_some_and(|word| self.store.can_toggle(&word)),
            Command::RemoveAllWords => true,
        }
    }

    /// Executes a command.
    pub fn execute(&mut self, command: Command) -> CoreResult<CommandOutcome> {
        debug!("Executing {}", command.id());

        match &command {
            Command::ToggleWord { .. } => {
                let Some(word) = self.applicable_word(&command) else {
                    return Ok(CommandOutcome::NoWord);
                };
                let applied = self.store.toggle_word(&word)?;
                if applied {
                    self.retag_all();
                }
                Ok(CommandOutcome::Toggled { word, applied })
            }
            Command::RemoveAllWords => {
                self.store.remove_all_words();
                self.retag_all();
                Ok(CommandOutcome::Cleared)
            }
        }
    }

    fn retag_all(&self) {
        for doc in self.documents.iter() {
            doc.tagger().on_word_list_changed();
        }
    }

    // ==================== Tags ====================

    /// Returns the tags overlapping `range` in a document's current text.
    ///
    /// Empty when highlighting is disabled.
    pub fn tags(&self, id: DocumentId, range: Span) -> CoreResult<Vec<Tag>> {
        let doc = self.document(id)?;
        if !self.config.highlight.enabled {
            return Ok(Vec::new());
        }
        Ok(doc.tagger().get_tags(range, &doc.snapshot()))
    }

    /// Returns the marker style for a tag.
    pub fn style(&self, tag: &Tag) -> MarkerStyle {
        self.config.highlight.style(tag.color)
    }

    /// Closes every document and writes the word list out.
    pub fn close(mut self) -> CoreResult<()> {
        let ids = self.documents.order().to_vec();
        for id in ids {
            self.close_document(id)?;
        }
        self.store.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("documents", &self.documents.len())
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::color_index;
    use crate::settings::MemorySettings;
    use tempfile::tempdir;

    fn editor() -> Editor {
        Editor::with_settings(Config::default(), Arc::new(MemorySettings::new()))
    }

    fn tagged(editor: &Editor, id: DocumentId) -> Vec<(Span, usize)> {
        let full = editor.document(id).unwrap().snapshot().full_span();
        editor
            .tags(id, full)
            .unwrap()
            .into_iter()
            .map(|tag| (tag.span, tag.color.get()))
            .collect()
    }

    fn toggle(word: &str) -> Command {
        Command::ToggleWord {
            word: Some(word.to_string()),
        }
    }

    #[test]
    fn test_toggle_caret_word() {
        let mut editor = editor();
        let id = editor.open_text("a.txt", "foo bar foofoo foo");
        editor.move_caret_to(1).unwrap();

        let outcome = editor.execute(Command::ToggleWord { word: None }).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Toggled {
                word: "foo".into(),
                applied: true
            }
        );
        assert_eq!(
            tagged(&editor, id),
            [(Span::new(0, 3), 0), (Span::new(15, 18), 0)]
        );
    }

    #[test]
    fn test_explicit_argument_wins() {
        let mut editor = editor();
        let id = editor.open_text("a.txt", "foo bar");
        editor.move_caret_to(1).unwrap();

        editor.execute(toggle("bar")).unwrap();
        assert_eq!(tagged(&editor, id), [(Span::new(4, 7), 0)]);

        // An argument with a space falls back to the caret word
        editor.execute(toggle("not a word")).unwrap();
        let words: Vec<String> = editor.words().into_iter().map(String::from).collect();
        assert_eq!(words, ["bar", "foo"]);
    }

    #[test]
    fn test_no_word_at_caret() {
        let mut editor = editor();
        editor.open_text("a.txt", "   ");
        editor.move_caret_to(1).unwrap();

        assert!(!editor.is_enabled(&Command::ToggleWord { word: None }));
        assert_eq!(
            editor.execute(Command::ToggleWord { word: None }).unwrap(),
            CommandOutcome::NoWord
        );
    }

    #[test]
    fn test_full_list_disables_toggle() {
        let mut editor = editor();
        for word in ["a", "b", "c", "d", "e"] {
            editor.execute(toggle(word)).unwrap();
        }

        assert!(!editor.is_enabled(&toggle("f")));
        assert!(editor.is_enabled(&toggle("c")));
        assert!(editor.is_enabled(&Command::RemoveAllWords));
        assert_eq!(
            editor.execute(toggle("f")).unwrap(),
            CommandOutcome::Toggled {
                word: "f".into(),
                applied: false
            }
        );
    }

    #[test]
    fn test_colors_follow_list_positions() {
        let mut editor = editor();
        let id = editor.open_text("a.txt", "a b c");
        for word in ["a", "b", "c"] {
            editor.execute(toggle(word)).unwrap();
        }
        assert_eq!(
            tagged(&editor, id),
            [(Span::new(0, 1), 0), (Span::new(2, 3), 1), (Span::new(4, 5), 2)]
        );

        editor.execute(toggle("a")).unwrap();
        assert_eq!(
            tagged(&editor, id),
            [(Span::new(2, 3), 0), (Span::new(4, 5), 1)]
        );
    }

    #[test]
    fn test_word_list_is_shared_by_documents() {
        let mut editor = editor();
        let first = editor.open_text("a.txt", "foo");
        let second = editor.open_text("b.txt", "x foo");

        editor.execute(toggle("foo")).unwrap();
        assert_eq!(tagged(&editor, first), [(Span::new(0, 3), 0)]);
        assert_eq!(tagged(&editor, second), [(Span::new(2, 5), 0)]);

        editor.execute(Command::RemoveAllWords).unwrap();
        assert!(tagged(&editor, first).is_empty());
        assert!(tagged(&editor, second).is_empty());
    }

    #[test]
    fn test_typing_retags() {
        let mut editor = editor();
        let id = editor.open_text("a.txt", "");
        editor.execute(toggle("foo")).unwrap();

        editor.insert_text("fo").unwrap();
        assert!(tagged(&editor, id).is_empty());

        editor.insert_text("o").unwrap();
        assert_eq!(tagged(&editor, id), [(Span::new(0, 3), 0)]);

        editor.delete_backward().unwrap();
        assert!(tagged(&editor, id).is_empty());
    }

    #[test]
    fn test_disabled_highlighting() {
        let mut config = Config::default();
        config.highlight.enabled = false;
        let mut editor = Editor::with_settings(config, Arc::new(MemorySettings::new()));
        let id = editor.open_text("a.txt", "foo");
        editor.execute(toggle("foo")).unwrap();
        assert!(tagged(&editor, id).is_empty());
    }

    #[test]
    fn test_close_document() {
        let mut editor = editor();
        let id = editor.open_text("a.txt", "foo");
        let mut rx = editor.subscribe();

        editor.close_document(id).unwrap();
        assert!(matches!(
            editor.tags(id, Span::new(0, 3)),
            Err(CoreError::DocumentNotFound(_))
        ));
        assert!(matches!(
            rx.try_recv(),
            Ok(HighlightEvent::DocumentClosed(closed)) if closed == id
        ));
        assert!(matches!(editor.insert_text("x"), Err(CoreError::NoActiveDocument)));
    }

    #[test]
    fn test_open_file_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "foo\nbar foo").unwrap();

        let mut editor = editor();
        let id = editor.open_file(&path).unwrap();
        assert_eq!(editor.open_file(&path).unwrap(), id);
        assert_eq!(editor.document(id).unwrap().name(), "notes.txt");

        editor.execute(toggle("foo")).unwrap();
        assert_eq!(
            tagged(&editor, id),
            [(Span::new(0, 3), 0), (Span::new(8, 11), 0)]
        );
    }

    #[test]
    fn test_close_persists_words() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.storage.settings_file = Some(dir.path().join("settings.toml"));

        let mut editor = Editor::open(config.clone()).unwrap();
        editor.open_text("a.txt", "foo");
        editor.execute(toggle("foo")).unwrap();
        editor.execute(toggle("bar")).unwrap();
        editor.close().unwrap();

        let reopened = Editor::open(config).unwrap();
        let words: Vec<String> = reopened.words().into_iter().map(String::from).collect();
        assert_eq!(words, ["foo", "bar"]);
    }

    #[test]
    fn test_style_lookup() {
        let mut editor = editor();
        let id = editor.open_text("a.txt", "foo");
        editor.execute(toggle("foo")).unwrap();

        let tags = editor.tags(id, Span::new(0, 3)).unwrap();
        assert_eq!(tags[0].color, color_index(0));
        assert_eq!(editor.style(&tags[0]).background, "Yellow");
    }
}

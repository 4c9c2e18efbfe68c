//! The canonical list of highlighted words.
//!
//! ## Learning: Single-Writer Discipline
//!
//! Every mutation runs inside one `parking_lot::Mutex` critical section
//! covering *mutate → persist → notify*, so concurrent toggles serialize and
//! subscribers observe notifications in mutation order. Readers get copies;
//! nobody outside this module ever holds a reference into the list.
//!
//! Each commit also bumps a revision number under the same lock. A reader
//! that copied the list together with its revision can later tell whether
//! the list has moved on since.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::color::PALETTE_SIZE;
use crate::config::StorageConfig;
use crate::event::{EventBus, HighlightEvent};
use crate::settings::{SettingsError, SettingsStore};
use crate::word::{InvalidWordError, Word};

/// Maximum number of highlighted words.
pub const WORD_LIST_CAPACITY: usize = 5;

// Every word in a full list gets its own color.
const _: () = assert!(WORD_LIST_CAPACITY == PALETTE_SIZE);

/// Owns the ordered, deduplicated, bounded word list and its persistence.
pub struct WordListStore {
    settings: Arc<dyn SettingsStore>,
    location: StorageConfig,
    words: Mutex<Vec<Word>>,
    revision: AtomicU64,
    events: EventBus,
}

impl WordListStore {
    /// Loads the word list from `settings`.
    ///
    /// Missing, unreadable or corrupt values load as an empty list.
    pub fn open(settings: Arc<dyn SettingsStore>, location: StorageConfig, events: EventBus) -> Self {
        let words = match settings.get_string(&location.collection, &location.key) {
            Ok(Some(value)) => decode(&value),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("Could not read highlight words, starting empty: {}", err);
                Vec::new()
            }
        };
        debug!("Loaded {} highlight words", words.len());

        Self {
            settings,
            location,
            words: Mutex::new(words),
            revision: AtomicU64::new(0),
            events,
        }
    }

    /// Adds `candidate` if absent, removes it if present.
    ///
    /// Returns `Ok(false)` without touching anything when the word is absent
    /// and the list is full.
    pub fn toggle_word(&self, candidate: &str) -> Result<bool, InvalidWordError> {
        let word = Word::new(candidate)?;
        let mut words = self.words.lock();

        if let Some(index) = words.iter().position(|w| *w == word) {
            words.remove(index);
            debug!("Removed highlight word {:?}", word.as_str());
        } else if words.len() >= WORD_LIST_CAPACITY {
            debug!("Highlight list full, not adding {:?}", word.as_str());
            return Ok(false);
        } else {
            debug!("Added highlight word {:?}", word.as_str());
            words.push(word);
        }

        self.commit(&words);
        Ok(true)
    }

    /// Returns true if [`toggle_word`](Self::toggle_word) would apply.
    pub fn can_toggle(&self, candidate: &str) -> bool {
        let Ok(word) = Word::new(candidate) else {
            return false;
        };
        let words = self.words.lock();
        words.contains(&word) || words.len() < WORD_LIST_CAPACITY
    }

    /// Clears the list. Always persists and notifies.
    pub fn remove_all_words(&self) {
        let mut words = self.words.lock();
        words.clear();
        self.commit(&words);
    }

    /// Returns a copy of the list in order.
    pub fn words(&self) -> Vec<Word> {
        self.words.lock().clone()
    }

    /// Returns a copy of the list and the revision it belongs to.
    pub fn words_with_revision(&self) -> (Vec<Word>, u64) {
        let words = self.words.lock();
        (words.clone(), self.revision.load(Ordering::Acquire))
    }

    /// Returns the number of committed mutations since the store opened.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Returns the position of `word`, if listed.
    pub fn position(&self, word: &str) -> Option<usize> {
        self.words.lock().iter().position(|w| w == word)
    }

    /// Writes the current list to the settings store.
    pub fn flush(&self) -> Result<(), SettingsError> {
        let words = self.words.lock();
        self.persist(&words)
    }

    /// Subscribes to store (and tagger) events.
    pub fn subscribe(&self) -> broadcast::Receiver<HighlightEvent> {
        self.events.subscribe()
    }

    /// Returns the bus this store notifies on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Bumps the revision, persists and notifies; called with the list
    /// lock held.
    fn commit(&self, words: &[Word]) {
        self.revision.fetch_add(1, Ordering::AcqRel);
        if let Err(err) = self.persist(words) {
            warn!("Could not save highlight words: {}", err);
        }
        self.events.emit(HighlightEvent::WordListChanged);
    }

    fn persist(&self, words: &[Word]) -> Result<(), SettingsError> {
        self.settings
            .set_string(&self.location.collection, &self.location.key, &encode(words))
    }
}

impl std::fmt::Debug for WordListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordListStore")
            .field("location", &self.location)
            .field("words", &*self.words.lock())
            .field("revision", &self.revision())
            .finish()
    }
}

/// Serializes the list as a JSON array of strings.
pub fn encode(words: &[Word]) -> String {
    let words: Vec<&str> = words.iter().map(Word::as_str).collect();
    serde_json::to_string(&words).unwrap_or_else(|_| "[]".to_string())
}

/// Parses a persisted list, dropping anything that breaks the list
/// invariants. Corrupt input yields an empty list.
pub fn decode(value: &str) -> Vec<Word> {
    let value = value.trim();
    if value.is_empty() {
        return Vec::new();
    }

    let raw: Vec<String> = match serde_json::from_str(value) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("Ignoring corrupt highlight words {:?}: {}", value, err);
            return Vec::new();
        }
    };

    let mut words: Vec<Word> = Vec::with_capacity(WORD_LIST_CAPACITY);
    for candidate in raw {
        match Word::new(candidate) {
            Ok(word) if words.contains(&word) => {
                debug!("Dropping duplicate highlight word {:?}", word.as_str());
            }
            Ok(_) if words.len() >= WORD_LIST_CAPACITY => {
                warn!("Dropping highlight words beyond capacity {}", WORD_LIST_CAPACITY);
                break;
            }
            Ok(word) => words.push(word),
            Err(err) => warn!("Dropping invalid highlight word: {}", err),
        }
    }
    words
}

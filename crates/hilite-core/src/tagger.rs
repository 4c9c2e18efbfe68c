//! Per-document highlight tagging.
//!
//! A [`HighlightTagger`] keeps the spans of every listed word in sync with
//! one document. Recomputation goes through three steps:
//!
//! ```text
//! trigger()  ── bump generation, capture snapshot + caret ──▶ UpdateRequest
//! compute()  ── findAll for each word, no locks held ───────▶ HighlightState
//! publish()  ── compare tokens under the request lock ──────▶ swap or discard
//! ```
//!
//! Only a computation whose token is still the latest, and whose word list
//! revision still matches the store's, may publish. A slow search started for
//! an old request or an old list can never overwrite a newer result. Readers
//! clone an `Arc` to the published state and translate its spans onto
//! whatever snapshot they query with.

use hilite_buffer::{Snapshot, Span, TextChange, TextSearch, is_normalized};
use parking_lot::{Mutex, RwLock};
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::color::{ColorIndex, color_index};
use crate::document::DocumentId;
use crate::event::{Delivery, EventBus, EventHandler, HighlightEvent};
use crate::store::WordListStore;
use crate::word::Word;

/// Identity of one recomputation request.
///
/// Generations are unique per tagger, so equal tokens mean no newer request
/// has been made in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    /// Monotonic request counter
    pub generation: u64,
    /// Snapshot version current at trigger time
    pub version: u64,
    /// Caret offset at trigger time
    pub caret: usize,
}

/// A captured request: the token plus the snapshot to search.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub token: RequestToken,
    pub snapshot: Snapshot,
}

/// All matches of one word.
#[derive(Debug, Clone)]
pub struct WordSpanSet {
    word: Word,
    spans: Vec<Span>,
}

impl WordSpanSet {
    /// Returns the word.
    pub fn word(&self) -> &Word {
        &self.word
    }

    /// Returns the matches, sorted and non-overlapping.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Returns the spans moved through `changes`.
    fn spans_through(&self, changes: &[TextChange]) -> Cow<'_, [Span]> {
        if changes.is_empty() {
            return Cow::Borrowed(&self.spans);
        }
        Cow::Owned(
            self.spans
                .iter()
                .map(|span| changes.iter().fold(*span, |span, change| change.map_span(span)))
                .collect(),
        )
    }
}

/// A published tagging result.
#[derive(Debug, Clone)]
pub struct HighlightState {
    token: RequestToken,
    revision: u64,
    snapshot: Snapshot,
    words: Vec<WordSpanSet>,
}

impl HighlightState {
    fn empty(token: RequestToken, revision: u64, snapshot: Snapshot) -> Self {
        Self {
            token,
            revision,
            snapshot,
            words: Vec::new(),
        }
    }

    /// Returns the request this state answers.
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Returns the word list revision the state was computed from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the snapshot every span set was computed on.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Returns one span set per word, in word list order.
    pub fn word_spans(&self) -> &[WordSpanSet] {
        &self.words
    }
}

/// A highlighted span and its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub span: Span,
    pub color: ColorIndex,
}

struct Request {
    token: RequestToken,
    snapshot: Snapshot,
    caret: usize,
}

/// Keeps highlight spans for one document.
pub struct HighlightTagger {
    document: DocumentId,
    store: Arc<WordListStore>,
    search: Arc<dyn TextSearch>,
    events: EventBus,
    generation: AtomicU64,
    request: Mutex<Request>,
    state: RwLock<Arc<HighlightState>>,
}

impl HighlightTagger {
    /// Creates a tagger and computes the initial tags right away.
    pub fn new(
        document: DocumentId,
        snapshot: Snapshot,
        caret: usize,
        store: Arc<WordListStore>,
        search: Arc<dyn TextSearch>,
    ) -> Self {
        let token = RequestToken {
            generation: 0,
            version: snapshot.version(),
            caret,
        };
        let events = store.events().clone();
        let initial = HighlightState::empty(token, store.revision(), snapshot.clone());

        let tagger = Self {
            document,
            store,
            search,
            events,
            generation: AtomicU64::new(0),
            request: Mutex::new(Request {
                token,
                snapshot,
                caret,
            }),
            state: RwLock::new(Arc::new(initial)),
        };
        tagger.refresh();
        tagger
    }

    /// Returns the document this tagger serves.
    pub fn document(&self) -> DocumentId {
        self.document
    }

    // ==================== Triggers ====================

    /// Handles a document change.
    ///
    /// Only a new snapshot triggers recomputation; the same snapshot with a
    /// moved caret just records the caret. Returns true if new tags were
    /// published.
    pub fn on_document_changed(&self, snapshot: Snapshot, caret: usize) -> bool {
        let request = {
            let mut current = self.request.lock();
            if snapshot.buffer_id() != current.snapshot.buffer_id() {
                warn!("Tagger for {} ignored a snapshot of another buffer", self.document);
                return false;
            }
            current.caret = caret;
            if snapshot.version() <= current.snapshot.version() {
                return false;
            }
            current.snapshot = snapshot;
            self.next_request(&mut current)
        };
        self.update(&request)
    }

    /// Records a caret move without recomputing.
    pub fn on_caret_moved(&self, caret: usize) {
        self.request.lock().caret = caret;
    }

    /// Handles a word list change. Returns true if new tags were published.
    pub fn on_word_list_changed(&self) -> bool {
        self.refresh()
    }

    /// Recomputes against the current snapshot.
    pub fn refresh(&self) -> bool {
        let request = self.trigger();
        self.update(&request)
    }

    /// Starts a new request, superseding every earlier one.
    pub fn trigger(&self) -> UpdateRequest {
        let mut current = self.request.lock();
        self.next_request(&mut current)
    }

    fn next_request(&self, current: &mut Request) -> UpdateRequest {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        current.token = RequestToken {
            generation,
            version: current.snapshot.version(),
            caret: current.caret,
        };
        UpdateRequest {
            token: current.token,
            snapshot: current.snapshot.clone(),
        }
    }

    fn update(&self, request: &UpdateRequest) -> bool {
        match self.compute(request) {
            Some(candidate) => self.publish(candidate),
            None => false,
        }
    }

    /// Returns true if no request was made after `token`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::Acquire) == token.generation
    }

    // ==================== Computation ====================

    /// Searches the request's snapshot for every listed word.
    ///
    /// Returns `None` if the request is superseded, or the word list
    /// changes, before all words were searched. A failing search counts as
    /// no matches for that word.
    pub fn compute(&self, request: &UpdateRequest) -> Option<HighlightState> {
        let (words, revision) = self.store.words_with_revision();
        let mut sets = Vec::with_capacity(words.len());

        for word in words {
            if !self.is_current(request.token) {
                debug!(
                    "Abandoning superseded highlight request {}",
                    request.token.generation
                );
                return None;
            }
            if self.store.revision() != revision {
                debug!(
                    "Abandoning highlight request {}: word list changed",
                    request.token.generation
                );
                return None;
            }

            let spans = match self.search.find_all(word.as_str(), &request.snapshot) {
                Ok(spans) => normalize(spans),
                Err(err) => {
                    warn!("Search for {:?} failed, treating as no matches: {}", word.as_str(), err);
                    Vec::new()
                }
            };
            sets.push(WordSpanSet { word, spans });
        }

        Some(HighlightState {
            token: request.token,
            revision,
            snapshot: request.snapshot.clone(),
            words: sets,
        })
    }

    /// Publishes `candidate` unless a newer request exists or the word list
    /// moved past the revision it was computed from.
    ///
    /// Raises [`HighlightEvent::TagsChanged`] over the whole document on
    /// success.
    pub fn publish(&self, candidate: HighlightState) -> bool {
        let current = self.request.lock();
        if current.token != candidate.token {
            debug!(
                "Discarding stale highlight state {} (latest {})",
                candidate.token.generation, current.token.generation
            );
            return false;
        }
        let revision = self.store.revision();
        if candidate.revision != revision {
            debug!(
                "Discarding highlight state {} built from word list revision {} (latest {})",
                candidate.token.generation, candidate.revision, revision
            );
            return false;
        }

        let full = candidate.snapshot.full_span();
        *self.state.write() = Arc::new(candidate);
        self.events.emit(HighlightEvent::TagsChanged {
            document: self.document,
            span: full,
        });
        true
    }

    // ==================== Queries ====================

    /// Returns the published state.
    pub fn state(&self) -> Arc<HighlightState> {
        Arc::clone(&self.state.read())
    }

    /// Returns the latest snapshot this tagger has seen.
    pub fn current_snapshot(&self) -> Snapshot {
        self.request.lock().snapshot.clone()
    }

    /// Returns every highlighted span overlapping `range` on `snapshot`.
    ///
    /// Spans are translated onto `snapshot` and returned whole, grouped by
    /// word in list order. An older or foreign snapshot yields nothing.
    pub fn get_tags(&self, range: Span, snapshot: &Snapshot) -> Vec<Tag> {
        let state = self.state();
        if state.words.iter().all(|set| set.spans.is_empty()) {
            return Vec::new();
        }

        // One walk of the version chain serves every word
        let changes = match state.snapshot.changes_to(snapshot) {
            Ok(changes) => changes,
            Err(err) => {
                debug!("No tags for {} on this snapshot: {}", self.document, err);
                return Vec::new();
            }
        };

        let mut tags = Vec::new();
        for (position, set) in state.words.iter().enumerate() {
            let spans = set.spans_through(&changes);
            let color = color_index(position);
            let first = spans.partition_point(|span| span.end <= range.start);
            tags.extend(
                spans[first..]
                    .iter()
                    .take_while(|span| span.start < range.end)
                    .filter(|span| !span.is_empty() && span.overlaps(&range))
                    .map(|&span| Tag { span, color }),
            );
        }

        tags
    }

    /// Drives this tagger from an event bus until its document closes.
    ///
    /// Each trigger is computed on the blocking pool without waiting for the
    /// previous one; superseded computations never publish. Falling behind
    /// the bus counts as a word list change, since one may have been missed.
    pub async fn listen(self: Arc<Self>, mut handler: EventHandler) {
        while let Some(delivery) = handler.next().await {
            match delivery {
                Delivery::Event(HighlightEvent::WordListChanged) => {
                    let request = self.trigger();
                    self.spawn_update(request);
                }
                Delivery::Lagged(missed) => {
                    warn!("Tagger for {} missed {} events, recomputing", self.document, missed);
                    let request = self.trigger();
                    self.spawn_update(request);
                }
                Delivery::Event(HighlightEvent::DocumentChanged {
                    document,
                    snapshot,
                    caret,
                }) if document == self.document => {
                    let tagger = Arc::clone(&self);
                    tokio::task::spawn_blocking(move || tagger.on_document_changed(snapshot, caret));
                }
                Delivery::Event(HighlightEvent::DocumentClosed(document))
                    if document == self.document =>
                {
                    break;
                }
                Delivery::Event(_) => {}
            }
        }
        debug!("Tagger for {} stopped listening", self.document);
    }

    fn spawn_update(self: &Arc<Self>, request: UpdateRequest) {
        let tagger = Arc::clone(self);
        tokio::task::spawn_blocking(move || tagger.update(&request));
    }
}

impl std::fmt::Debug for HighlightTagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightTagger")
            .field("document", &self.document)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

/// Sorts spans and drops any that overlap an earlier one.
fn normalize(mut spans: Vec<Span>) -> Vec<Span> {
    if is_normalized(&spans) {
        return spans;
    }
    spans.sort_by_key(|span| (span.start, span.end));
    let mut end = 0;
    spans.retain(|span| {
        let keep = span.start >= end;
        if keep {
            end = span.end;
        }
        keep
    });
    spans
}

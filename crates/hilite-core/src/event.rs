//! Event system for highlight notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Rust's ownership model makes traditional observer patterns tricky.
//! We use `tokio::sync::broadcast` for a safe, async-friendly event bus.
//!
//! Key differences from OOP observers:
//! - No object references to manage
//! - Events are values, not callbacks
//! - Subscribers receive copies (Clone)
//! - No lifetime complexity

use hilite_buffer::{Snapshot, Span};
use tokio::sync::broadcast;

use crate::document::DocumentId;

/// Events raised by the word list store, documents and taggers.
#[derive(Debug, Clone)]
pub enum HighlightEvent {
    /// The persisted word list changed
    WordListChanged,

    /// A document produced a new snapshot
    DocumentChanged {
        document: DocumentId,
        snapshot: Snapshot,
        caret: usize,
    },

    /// A tagger published new tags; `span` is expressed against the
    /// document's snapshot at publish time
    TagsChanged { document: DocumentId, span: Span },

    /// A document was closed
    DocumentClosed(DocumentId),
}

/// Event bus for broadcasting highlight events.
///
/// ## Design
///
/// Using a broadcast channel allows:
/// - Multiple subscribers (every open document's tagger, the host)
/// - Async reception
/// - No direct coupling between components
/// - Lagged receivers don't block senders
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HighlightEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: HighlightEvent) {
        // Ignore error if no receivers (not a problem)
        let _ = self.sender.send(event);
    }

    /// Subscribes to events.
    ///
    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<HighlightEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// What an [`EventHandler`] received.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// The next event in order
    Event(HighlightEvent),

    /// The receiver fell behind and `n` events were dropped; any of them
    /// may have been a [`HighlightEvent::WordListChanged`]
    Lagged(u64),
}

/// Helper for processing events asynchronously.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(store.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(delivery) = handler.next().await {
///         match delivery {
///             Delivery::Event(HighlightEvent::WordListChanged) | Delivery::Lagged(_) => {
///                 // Recompute
///             }
///             Delivery::Event(_) => {}
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<HighlightEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<HighlightEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event, or reports that some were missed.
    ///
    /// Returns `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<Delivery> {
        match self.receiver.recv().await {
            Ok(event) => Some(Delivery::Event(event)),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Event handler lagged, missed {} events", n);
                Some(Delivery::Lagged(n))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(HighlightEvent::WordListChanged);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, HighlightEvent::WordListChanged));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(HighlightEvent::WordListChanged);

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_ends_when_bus_dropped() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        bus.emit(HighlightEvent::WordListChanged);
        drop(bus);

        assert!(matches!(
            handler.next().await,
            Some(Delivery::Event(HighlightEvent::WordListChanged))
        ));
        assert!(handler.next().await.is_none());
    }

    #[tokio::test]
    async fn test_handler_reports_lag() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        bus.emit(HighlightEvent::WordListChanged);
        for _ in 0..300 {
            bus.emit(HighlightEvent::DocumentClosed(DocumentId::new()));
        }

        // The word list change fell out of the buffer
        assert!(matches!(handler.next().await, Some(Delivery::Lagged(45))));
        assert!(matches!(
            handler.next().await,
            Some(Delivery::Event(HighlightEvent::DocumentClosed(_)))
        ));
    }
}

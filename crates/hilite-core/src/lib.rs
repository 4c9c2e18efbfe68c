//! # Hilite Core
//!
//! Multi-word highlighting: a persistent list of up to five words, each
//! drawn in its own color wherever it occurs in an open document.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Editor                             │
//! │  ┌──────────────┐  ┌──────────┐  ┌──────────────────────┐ │
//! │  │ WordListStore│  │  Config  │  │ Commands / caret word│ │
//! │  └──────┬───────┘  └──────────┘  └──────────────────────┘ │
//! │         │ WordListChanged                                 │
//! │  ┌──────┴───────────────────────────────────┐             │
//! │  │             Document Manager              │             │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐   │             │
//! │  │  │ Doc + ✦  │ │ Doc + ✦  │ │ Doc + ✦  │   │  ✦ = tagger │
//! │  │  └──────────┘ └──────────┘ └──────────┘   │             │
//! │  └───────────────────────────────────────────┘             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod caret_word;
pub mod color;
pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod event;
pub mod settings;
pub mod store;
pub mod tagger;
pub mod word;

pub use caret_word::{resolve_caret_word, word_extent_is_valid};
pub use color::{ColorIndex, MarkerStyle, PALETTE_SIZE, color_index, default_palette};
pub use command::{Command, CommandOutcome};
pub use config::{Config, ConfigError, HighlightConfig, StorageConfig};
pub use document::{Document, DocumentId, DocumentManager};
pub use editor::Editor;
pub use event::{Delivery, EventBus, EventHandler, HighlightEvent};
pub use settings::{FileSettings, MemorySettings, SettingsError, SettingsStore};
pub use store::{WORD_LIST_CAPACITY, WordListStore};
pub use tagger::{HighlightState, HighlightTagger, RequestToken, Tag, UpdateRequest, WordSpanSet};
pub use word::{InvalidWordError, Word, is_valid_word};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("No active document")]
    NoActiveDocument,

    #[error("Invalid word: {0}")]
    InvalidWord(#[from] InvalidWordError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Buffer error: {0}")]
    Buffer(#[from] hilite_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

//! Persistent key/value settings.
//!
//! Values are plain strings grouped into named collections, the way editor
//! hosts expose their user settings. [`FileSettings`] keeps them in a TOML
//! file:
//!
//! ```toml
//! ["Text Editor"]
//! HighlightWords = '["foo","bar"]'
//! ```

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Settings collections keyed by name.
type Collections = BTreeMap<String, BTreeMap<String, String>>;

/// Errors raised by a settings backend.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Settings unavailable: {0}")]
    Unavailable(String),
}

/// A textual settings store.
///
/// ## Learning: Trait Objects
///
/// The word list store holds an `Arc<dyn SettingsStore>`, so tests can use
/// [`MemorySettings`] while the application writes to disk.
pub trait SettingsStore: Send + Sync {
    /// Reads a value; `Ok(None)` if it was never written.
    fn get_string(&self, collection: &str, key: &str) -> Result<Option<String>, SettingsError>;

    /// Writes a value, creating the collection if needed.
    fn set_string(&self, collection: &str, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// In-process settings, lost when dropped.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<(String, String), String>>,
}

impl MemorySettings {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get_string(&self, collection: &str, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self
            .values
            .lock()
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }

    fn set_string(&self, collection: &str, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .lock()
            .insert((collection.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

/// Settings stored in a TOML file, one table per collection.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    /// Uses the file at `path`; it is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the default settings file.
    pub fn open_default() -> Result<Self, SettingsError> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Returns the default settings file path.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(config_dir.join("hilite").join("settings.toml"))
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Collections, SettingsError> {
        if !self.path.exists() {
            return Ok(Collections::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn write(&self, collections: &Collections) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write to a temporary file first, then rename (atomic write)
        let content = toml::to_string_pretty(collections)?;
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get_string(&self, collection: &str, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self
            .read()?
            .get(collection)
            .and_then(|values| values.get(key))
            .cloned())
    }

    fn set_string(&self, collection: &str, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut collections = self.read()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.write(&collections)
    }
}

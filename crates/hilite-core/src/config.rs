//! Highlighter configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! Serde is Rust's standard for serialization/deserialization.
//! The `#[derive(Serialize, Deserialize)]` macro generates
//! code to convert structs to/from JSON, TOML, etc.
//!
//! `#[serde(default)]` uses Default::default() for missing fields,
//! making configs backward-compatible.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::{ColorIndex, MarkerStyle, default_palette};
use crate::settings::{FileSettings, SettingsError};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the word list is persisted
    pub storage: StorageConfig,

    /// Highlight rendering settings
    pub highlight: HighlightConfig,
}

impl Config {
    /// Loads config from the default location.
    pub fn load() -> Self {
        Self::load_from_default_path().unwrap_or_default()
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads from the default config path.
    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("hilite").join("config.toml"))
    }
}

/// Word list persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Settings file (None = platform config dir)
    pub settings_file: Option<PathBuf>,

    /// Settings collection holding the list
    pub collection: String,

    /// Name of the value inside the collection
    pub key: String,
}

impl StorageConfig {
    /// Opens the settings file this config points at.
    pub fn file_settings(&self) -> Result<FileSettings, SettingsError> {
        match &self.settings_file {
            Some(path) => Ok(FileSettings::new(path)),
            None => FileSettings::open_default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_file: None,
            collection: "Text Editor".to_string(),
            key: "HighlightWords".to_string(),
        }
    }
}

/// Highlight rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Produce tags at all
    pub enabled: bool,

    /// One marker style per color index
    pub palette: Vec<MarkerStyle>,
}

impl HighlightConfig {
    /// Returns the style for a color, falling back to the stock palette
    /// when the configured one is short.
    pub fn style(&self, color: ColorIndex) -> MarkerStyle {
        self.palette
            .get(color.get())
            .cloned()
            .or_else(|| default_palette().get(color.get()).cloned())
            .unwrap_or_else(|| MarkerStyle {
                background: "Yellow".to_string(),
                foreground: "DarkRed".to_string(),
            })
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            palette: default_palette(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::color_index;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.collection, "Text Editor");
        assert_eq!(config.storage.key, "HighlightWords");
        assert!(config.highlight.enabled);
        assert_eq!(config.highlight.palette.len(), 5);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.storage, config.storage);
        assert_eq!(parsed.highlight.palette, config.highlight.palette);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [storage]
            settings_file = "/tmp/hilite.toml"

            [highlight]
            palette = [{ background = "Pink", foreground = "Black" }]
            "#,
        )
        .unwrap();

        assert_eq!(parsed.storage.key, "HighlightWords");
        assert!(parsed.highlight.enabled);
        assert_eq!(parsed.highlight.style(color_index(0)).background, "Pink");
        assert_eq!(parsed.highlight.style(color_index(3)).background, "Lime");
    }
}

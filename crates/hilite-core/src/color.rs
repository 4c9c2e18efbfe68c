//! Color assignment for highlighted words.
//!
//! A word's color is derived from its position in the word list, never from
//! the word itself: removing a word shifts the colors of every word after it.

use serde::{Deserialize, Serialize};

/// Number of distinct highlight colors.
pub const PALETTE_SIZE: usize = 5;

/// Index of a highlight color, always in `0..PALETTE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColorIndex(usize);

impl ColorIndex {
    /// Returns the raw index.
    pub fn get(self) -> usize {
        self.0
    }

    /// Returns the marker format name used to render this color.
    pub fn marker_name(self) -> String {
        format!(
            "MarkerFormatDefinition/HighlightWordFormatDefinition{}",
            self.0 + 1
        )
    }

    /// Returns the user-visible name of this color.
    pub fn display_name(self) -> String {
        format!("Highlight Word {}", self.0 + 1)
    }
}

impl std::fmt::Display for ColorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps a position in the word list to its color.
pub fn color_index(position: usize) -> ColorIndex {
    ColorIndex(position % PALETTE_SIZE)
}

/// Visual style of one highlight color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerStyle {
    /// Background color name
    pub background: String,
    /// Foreground color name
    pub foreground: String,
}

impl MarkerStyle {
    fn new(background: &str) -> Self {
        Self {
            background: background.to_string(),
            foreground: "DarkRed".to_string(),
        }
    }
}

/// The stock marker styles, one per color index.
pub fn default_palette() -> Vec<MarkerStyle> {
    ["Yellow", "GreenYellow", "Gold", "Lime", "LimeGreen"]
        .into_iter()
        .map(MarkerStyle::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_wraps_at_palette_size() {
        assert_eq!(color_index(0).get(), 0);
        assert_eq!(color_index(4).get(), 4);
        assert_eq!(color_index(5).get(), 0);
        assert_eq!(color_index(12).get(), 2);
    }

    #[test]
    fn test_marker_names_are_one_based() {
        assert_eq!(
            color_index(0).marker_name(),
            "MarkerFormatDefinition/HighlightWordFormatDefinition1"
        );
        assert_eq!(color_index(4).display_name(), "Highlight Word 5");
    }

    #[test]
    fn test_default_palette_covers_every_color() {
        let palette = default_palette();
        assert_eq!(palette.len(), PALETTE_SIZE);
        assert_eq!(palette[1].background, "GreenYellow");
        assert!(palette.iter().all(|style| style.foreground == "DarkRed"));
    }
}

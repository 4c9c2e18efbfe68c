//! Highlight commands.
//!
//! ## Learning: The Command Pattern
//!
//! Commands encapsulate actions as values: a host can bind them to menus or
//! keys, look them up by id and ask whether they are enabled before running
//! them through [`Editor::execute`](crate::Editor::execute).

/// Built-in highlight commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Toggle a word: the argument if given, the caret word otherwise
    ToggleWord { word: Option<String> },

    /// Clear the word list
    RemoveAllWords,
}

impl Command {
    pub const TOGGLE_WORD_ID: &'static str = "Edit.ToggleHighlightWord";
    pub const REMOVE_ALL_WORDS_ID: &'static str = "Edit.RemoveAllHighlightWords";

    /// Returns the command's stable id.
    pub fn id(&self) -> &'static str {
        match self {
            Command::ToggleWord { .. } => Self::TOGGLE_WORD_ID,
            Command::RemoveAllWords => Self::REMOVE_ALL_WORDS_ID,
        }
    }

    /// Returns the command's display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Command::ToggleWord { .. } => "Toggle Highlight Word",
            Command::RemoveAllWords => "Remove All Highlight Words",
        }
    }

    /// Describes the accepted argument, if any.
    pub fn parameters_description(&self) -> Option<&'static str> {
        match self {
            Command::ToggleWord { .. } => Some("<word>"),
            Command::RemoveAllWords => None,
        }
    }

    /// Builds a command from its id and optional argument.
    pub fn from_id(id: &str, argument: Option<String>) -> Option<Self> {
        match id {
            Self::TOGGLE_WORD_ID => Some(Command::ToggleWord { word: argument }),
            Self::REMOVE_ALL_WORDS_ID => Some(Command::RemoveAllWords),
            _ => None,
        }
    }

    /// Returns the argument if it can stand for a word by itself.
    ///
    /// An empty argument or one containing a space falls back to the caret
    /// word.
    pub fn explicit_word(&self) -> Option<&str> {
        match self {
            Command::ToggleWord { word: Some(word) } if !word.is_empty() && !word.contains(' ') => {
                Some(word)
            }
            _ => None,
        }
    }

    /// Returns all built-in commands, as a host would register them.
    pub fn all() -> [Command; 2] {
        [Command::ToggleWord { word: None }, Command::RemoveAllWords]
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What running a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// `word` was toggled; `applied` is false when the list was full
    Toggled { word: String, applied: bool },

    /// There was no applicable word
    NoWord,

    /// The list was cleared
    Cleared,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for command in Command::all() {
            assert_eq!(Command::from_id(command.id(), None), Some(command));
        }
        assert_eq!(Command::from_id("Edit.Unknown", None), None);
    }

    #[test]
    fn test_from_id_keeps_argument() {
        let command = Command::from_id(Command::TOGGLE_WORD_ID, Some("foo".into()));
        assert_eq!(
            command,
            Some(Command::ToggleWord {
                word: Some("foo".into())
            })
        );
    }

    #[test]
    fn test_explicit_word() {
        let toggle = |word: Option<&str>| Command::ToggleWord {
            word: word.map(String::from),
        };

        assert_eq!(toggle(Some("foo")).explicit_word(), Some("foo"));
        assert_eq!(toggle(Some("")).explicit_word(), None);
        assert_eq!(toggle(Some("foo bar")).explicit_word(), None);
        assert_eq!(toggle(None).explicit_word(), None);
        assert_eq!(Command::RemoveAllWords.explicit_word(), None);
    }

    #[test]
    fn test_parameters_description() {
        assert_eq!(
            Command::ToggleWord { word: None }.parameters_description(),
            Some("<word>")
        );
        assert_eq!(Command::RemoveAllWords.parameters_description(), None);
    }
}

//! Resolving the word under the caret.
//!
//! A caret sits *between* characters. When it sits right after a word
//! (`foo|`) the navigator reports whatever follows, so resolution retries one
//! character back before giving up.

use hilite_buffer::{Snapshot, TextExtent, WordNavigator};

/// Returns true if `extent` is something worth highlighting: a significant
/// token containing at least one letter.
pub fn word_extent_is_valid(snapshot: &Snapshot, extent: &TextExtent) -> bool {
    extent.is_significant
        && snapshot
            .slice(extent.span)
            .is_ok_and(|text| text.chars().any(char::is_alphabetic))
}

/// Resolves the word at `caret`, if any.
pub fn resolve_caret_word<N>(snapshot: &Snapshot, caret: usize, navigator: &N) -> Option<String>
where
    N: WordNavigator + ?Sized,
{
    if caret > snapshot.len_chars() {
        return None;
    }

    let mut extent = navigator.extent_of_word(snapshot, caret);
    if !word_extent_is_valid(snapshot, &extent) {
        if !worth_retrying(snapshot, caret, &extent) {
            return None;
        }
        extent = navigator.extent_of_word(snapshot, caret - 1);
        if !word_extent_is_valid(snapshot, &extent) {
            return None;
        }
    }

    snapshot.slice(extent.span).ok().map(|text| text.into_owned())
}

fn worth_retrying(snapshot: &Snapshot, caret: usize, extent: &TextExtent) -> bool {
    if extent.span.start != caret {
        return false;
    }
    let Ok(line) = snapshot.line_span(caret) else {
        return false;
    };
    if caret == line.start {
        return false;
    }
    snapshot
        .char_at(caret - 1)
        .is_some_and(|c| !c.is_whitespace())
}

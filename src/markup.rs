//! Toggling of inline markup tags such as `<i>`/`</i>` in subtitle text.
//!
//! Positions are counted in characters, the way an editing surface reports
//! its caret, and are clamped to the length of the text.

use crate::error::SubframeError;

/// An opening tag and the closing tag derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    open: String,
    close: String,
}

impl Marker {
    /// Derives the closing tag by inserting `/` after the first character,
    /// so `<i>` closes with `</i>`.
    pub fn new(open: &str) -> Result<Self, SubframeError> {
        derive_close(open)
            .map(|close| Self {
                open: open.to_string(),
                close,
            })
            .ok_or_else(|| SubframeError::InvalidMarker(open.to_string()))
    }

    pub fn emphasis() -> Self {
        Self::builtin("<i>")
    }

    pub fn strong() -> Self {
        Self::builtin("<b>")
    }

    fn builtin(open: &'static str) -> Self {
        Self::new(open).expect("built-in tags are at least two characters")
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    fn open_len(&self) -> usize {
        self.open.chars().count()
    }
}

/// Caret or selected span in the text under edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Caret(usize),
    /// Half-open range `[start, end)`.
    Range { start: usize, end: usize },
}

impl Selection {
    /// Builds a selection from the two ends reported by an editor. Equal
    /// ends collapse to a caret and reversed ends are swapped.
    pub fn new(anchor: usize, position: usize) -> Self {
        if anchor == position {
            Selection::Caret(position)
        } else {
            Selection::Range {
                start: anchor.min(position),
                end: anchor.max(position),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub text: String,
    pub selection: Selection,
}

/// Adds or removes `marker` around the selection, or inserts whichever of
/// its tags closes the span the caret is in.
pub fn toggle(text: &str, marker: &Marker, selection: Selection) -> Toggled {
    match selection {
        Selection::Caret(caret) => toggle_at_caret(text, marker, caret),
        Selection::Range { start, end } if start == end => toggle_at_caret(text, marker, start),
        Selection::Range { start, end } => {
            toggle_range(text, marker, start.min(end), start.max(end))
        }
    }
}

fn toggle_range(text: &str, marker: &Marker, start: usize, end: usize) -> Toggled {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end);
    let (start, end) = (char_count(&text[..start_byte]), char_count(&text[..end_byte]));
    let shift = marker.open_len();

    if text[..start_byte].ends_with(marker.open()) {
        let before = &text[..start_byte - marker.open().len()];
        let selected = &text[start_byte..end_byte];
        let after = &text[end_byte..];
        let after = after.strip_prefix(marker.close()).unwrap_or(after);
        Toggled {
            text: [before, selected, after].concat(),
            selection: Selection::Range {
                start: start - shift,
                end: end - shift,
            },
        }
    } else {
        Toggled {
            text: [
                &text[..start_byte],
                marker.open(),
                &text[start_byte..end_byte],
                marker.close(),
                &text[end_byte..],
            ]
            .concat(),
            selection: Selection::Range {
                start: start + shift,
                end: end + shift,
            },
        }
    }
}

fn toggle_at_caret(text: &str, marker: &Marker, caret: usize) -> Toggled {
    let caret_byte = byte_offset(text, caret);
    let before = &text[..caret_byte];
    let opened = before.matches(marker.open()).count();
    let closed = before.matches(marker.close()).count();
    let tag = if opened > closed {
        marker.close()
    } else {
        marker.open()
    };
    Toggled {
        text: [before, tag, &text[caret_byte..]].concat(),
        selection: Selection::Caret(char_count(before) + char_count(tag)),
    }
}

/// `None` when the tag is too short to split after its first character.
fn derive_close(open: &str) -> Option<String> {
    let mut chars = open.chars();
    let first = chars.next()?;
    let rest = chars.as_str();
    if rest.is_empty() {
        return None;
    }
    Some(format!("{}/{}", first, rest))
}

fn byte_offset(text: &str, pos: usize) -> usize {
    text.char_indices()
        .nth(pos)
        .map_or(text.len(), |(offset, _)| offset)
}

fn char_count(text: &str) -> usize {
    text.chars().count()
}

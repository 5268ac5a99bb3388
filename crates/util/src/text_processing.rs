//! # Text Processing Utilities
//!
//! Log content is untrusted. Before it reaches the terminal, control
//! characters (including the ESC that starts ANSI sequences) are replaced so
//! a record cannot move the cursor, recolor the screen or clear it.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Replacement used for neutralized control characters.
const REPLACEMENT: char = '\u{FFFD}';

/// Returns text that is safe to print inside a single terminal line.
///
/// Line breaks and tabs become spaces; every other control character is
/// replaced by U+FFFD. Borrowed input is returned unchanged when clean.
///
/// # Example
/// ```rust
/// use logtide_util::text_processing::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("plain"), "plain");
/// assert_eq!(sanitize_for_terminal("a\nb"), "a b");
/// assert_eq!(sanitize_for_terminal("\u{1b}[2J"), "\u{FFFD}[2J");
/// ```
pub fn sanitize_for_terminal(input: &str) -> Cow<'_, str> {
    if !input.chars().any(char::is_control) {
        return Cow::Borrowed(input);
    }
    let cleaned = input
        .chars()
        .map(|character| match character {
            '\n' | '\r' | '\t' => ' ',
            other if other.is_control() => REPLACEMENT,
            other => other,
        })
        .collect();
    Cow::Owned(cleaned)
}

/// Truncates `input` to at most `max_width` display columns, appending an
/// ellipsis when anything was cut.
pub fn truncate_with_ellipsis(input: &str, max_width: usize) -> Cow<'_, str> {
    if input.width() <= max_width {
        return Cow::Borrowed(input);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }
    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::with_capacity(max_width + 3);
    for character in input.chars() {
        let width = character.width().unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        out.push(character);
    }
    out.push('…');
    Cow::Owned(out)
}

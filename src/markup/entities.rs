//! Character entity substitution for generated HTML.
//!
//! Manual text is Windows-1252. Markup-significant characters, the accented
//! letters the viewer always spelled as named entities, and the RISC OS list
//! bullet are replaced; everything else is copied through.
use std::borrow::Cow;

use phf::phf_map;

/// Non-breaking space.
pub const NBSP: &str = "&nbsp;";

/// Entity the list bullet is rendered as.
pub const BULLET: &str = "&#8226;";

static ENTITY_MAP: phf::Map<char, &'static str> = phf_map! {
    '"' => "&quot;",
    '&' => "&amp;",
    '<' => "&lt;",
    '>' => "&gt;",
    'ä' => "&auml;",
    'Ä' => "&Auml;",
    'ö' => "&ouml;",
    'Ö' => "&Ouml;",
    'ü' => "&uuml;",
    'Ü' => "&Uuml;",
    'ß' => "&szlig;",
    '\u{8F}' => BULLET,
};

/// Entity for `c`, if it has one.
#[inline]
pub fn entity(c: char) -> Option<&'static str> {
    ENTITY_MAP.get(&c).copied()
}

/// Append `c` to `out`, substituting its entity. NUL produces nothing.
#[inline]
pub fn push_escaped_char(out: &mut String, c: char) {
    match entity(c) {
        Some(replacement) => out.push_str(replacement),
        None if c == '\0' => {},
        None => out.push(c),
    }
}

/// Append `text` to `out` with every character escaped.
pub fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        push_escaped_char(out, c);
    }
}

/// Escape `text`, borrowing it when nothing needs replacing.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| c == '\0' || entity(c).is_some()) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    push_escaped(&mut out, text);
    Cow::Owned(out)
}

/// Escape a value placed inside a double-quoted attribute.
pub fn escape_attribute(text: &str) -> Cow<'_, str> {
    if !text.contains(['"', '&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

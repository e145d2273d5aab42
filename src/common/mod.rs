//! Common types and utilities shared by the image, markup and page layers.
//!
//! This module provides the binary reader used by the archive parser, the 8-bit
//! text codec, container detection and the unified error type.

// Submodule declarations
pub mod binary;
pub mod detection;
pub mod encoding;
pub mod error;

// Re-exports for convenience
pub use binary::{ByteView, align};
pub use detection::{ContainerFormat, detect_container, detect_container_from_bytes};
pub use encoding::{LIST_BULLET, decode_text, encode_text};
pub use error::{Error, Result};

/// Case-insensitive name comparison as used for archive entries and commands.
///
/// Non-ASCII letters are folded too, since manual names are Latin-1.
#[inline]
pub fn names_match(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive `starts_with` for ASCII keywords.
#[inline]
pub fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

//! 8-bit text codec for manual contents.
//!
//! Manuals are written in the RISC OS Latin-1 character set. Windows-1252 is the
//! closest codec available and maps every byte to a character, so decoding never
//! fails. The RISC OS bullet glyph (byte `0x8F`) has no Windows-1252 meaning and
//! decodes to the C1 control U+008F, which the renderer treats as a list bullet.

use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;

/// Character produced by decoding the RISC OS list bullet byte.
pub const LIST_BULLET: char = '\u{8F}';

/// Decode manual bytes into a `String`.
///
/// # Examples
/// ```
/// use stronghelp::common::encoding::decode_text;
///
/// assert_eq!(decode_text(b"Gr\xfc\xdfe"), "Grüße");
/// ```
#[inline]
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Encode text back to the 8-bit form used for exported files.
///
/// Characters outside the code page become numeric character references.
#[inline]
pub fn encode_text(text: &str) -> Cow<'_, [u8]> {
    let (bytes, _, _) = WINDOWS_1252.encode(text);
    bytes
}

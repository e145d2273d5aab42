//! Bounds-checked binary reader over an immutable archive buffer.
//!
//! All multi-byte reads are little-endian unless the method name says otherwise.
//! Every read is validated against the end of the underlying buffer; a read that
//! would run past it is an error, never a silently zero-filled value. The directory
//! walker relies on that to notice corrupt offsets.

use bytes::Bytes;
use memchr::memchr;
use thiserror::Error;
use zerocopy::{BE, FromBytes, I32, LE, U16, U32};

use crate::common::encoding::decode_text;

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    #[error("Insufficient data at offset {offset}: expected {expected} bytes, {available} available")]
    InsufficientData {
        offset: usize,
        expected: usize,
        available: usize,
    },
    /// A NUL-terminated string ran into the end of the buffer
    #[error("Unterminated string at offset {offset}")]
    MissingTerminator { offset: usize },
    /// Failed to parse the data
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Round `x` up to the next multiple of four (word alignment).
///
/// # Examples
///
/// ```
/// use stronghelp::common::binary::align;
/// assert_eq!(align(24), 24);
/// assert_eq!(align(26), 28);
/// ```
#[inline]
pub const fn align(x: usize) -> usize {
    x.next_multiple_of(4)
}

/// Read-only view of a byte buffer with a fixed base and a settable default offset.
///
/// Every accessor takes an offset relative to `base + default_offset`. Cloning a
/// view is cheap: the buffer is reference counted.
#[derive(Debug, Clone, Default)]
pub struct ByteView {
    data: Bytes,
    base: usize,
    default_offset: usize,
}

impl ByteView {
    /// Create a view over the whole buffer.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_base(data, 0)
    }

    /// Create a view whose offsets are relative to `base`.
    pub fn with_base(data: impl Into<Bytes>, base: usize) -> Self {
        Self {
            data: data.into(),
            base,
            default_offset: 0,
        }
    }

    /// Builder form of [`ByteView::set_default_offset`].
    #[inline]
    pub fn with_default_offset(mut self, offset: usize) -> Self {
        self.default_offset = offset;
        self
    }

    #[inline]
    pub fn set_default_offset(&mut self, offset: usize) {
        self.default_offset = offset;
    }

    #[inline]
    pub fn default_offset(&self) -> usize {
        self.default_offset
    }

    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    /// Length of the underlying buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The whole underlying buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes left between `offset` and the end of the buffer.
    pub fn remaining(&self, offset: usize) -> usize {
        self.absolute(offset)
            .map_or(0, |start| self.data.len().saturating_sub(start))
    }

    #[inline]
    fn absolute(&self, offset: usize) -> Option<usize> {
        self.base
            .checked_add(self.default_offset)?
            .checked_add(offset)
    }

    /// Resolve `offset` and check that `len` bytes are available from there.
    fn range(&self, offset: usize, len: usize) -> BinaryResult<std::ops::Range<usize>> {
        let start = self.absolute(offset);
        match start.and_then(|s| s.checked_add(len).map(|e| (s, e))) {
            Some((start, end)) if end <= self.data.len() => Ok(start..end),
            _ => Err(BinaryError::InsufficientData {
                offset,
                expected: len,
                available: self.remaining(offset),
            }),
        }
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn bytes_at(&self, offset: usize, len: usize) -> BinaryResult<&[u8]> {
        let range = self.range(offset, len)?;
        Ok(&self.data[range])
    }

    #[inline]
    pub fn byte(&self, offset: usize) -> BinaryResult<i8> {
        self.unsigned_byte(offset).map(|b| b as i8)
    }

    #[inline]
    pub fn unsigned_byte(&self, offset: usize) -> BinaryResult<u8> {
        let range = self.range(offset, 1)?;
        Ok(self.data[range.start])
    }

    #[inline]
    pub fn unsigned_half_word(&self, offset: usize) -> BinaryResult<u16> {
        U16::<LE>::read_from_bytes(self.bytes_at(offset, 2)?)
            .map(|v| v.get())
            .map_err(|_| BinaryError::ParseError("Failed to read u16".to_string()))
    }

    #[inline]
    pub fn unsigned_half_word_be(&self, offset: usize) -> BinaryResult<u16> {
        U16::<BE>::read_from_bytes(self.bytes_at(offset, 2)?)
            .map(|v| v.get())
            .map_err(|_| BinaryError::ParseError("Failed to read u16".to_string()))
    }

    #[inline]
    pub fn unsigned_word(&self, offset: usize) -> BinaryResult<u32> {
        U32::<LE>::read_from_bytes(self.bytes_at(offset, 4)?)
            .map(|v| v.get())
            .map_err(|_| BinaryError::ParseError("Failed to read u32".to_string()))
    }

    #[inline]
    pub fn unsigned_word_be(&self, offset: usize) -> BinaryResult<u32> {
        U32::<BE>::read_from_bytes(self.bytes_at(offset, 4)?)
            .map(|v| v.get())
            .map_err(|_| BinaryError::ParseError("Failed to read u32".to_string()))
    }

    #[inline]
    pub fn word(&self, offset: usize) -> BinaryResult<i32> {
        I32::<LE>::read_from_bytes(self.bytes_at(offset, 4)?)
            .map(|v| v.get())
            .map_err(|_| BinaryError::ParseError("Failed to read i32".to_string()))
    }

    #[inline]
    pub fn word_be(&self, offset: usize) -> BinaryResult<i32> {
        I32::<BE>::read_from_bytes(self.bytes_at(offset, 4)?)
            .map(|v| v.get())
            .map_err(|_| BinaryError::ParseError("Failed to read i32".to_string()))
    }

    /// Four-byte block marker such as `DIR$` or `DATA`.
    pub fn marker(&self, offset: usize) -> BinaryResult<[u8; 4]> {
        let bytes = self.bytes_at(offset, 4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// NUL-terminated 8-bit string starting at `offset`.
    ///
    /// Fails if no terminator exists before the end of the buffer.
    pub fn text_at(&self, offset: usize) -> BinaryResult<String> {
        self.bytes_until_nul(offset).map(decode_text)
    }

    /// Raw bytes of a NUL-terminated string, terminator excluded.
    pub fn bytes_until_nul(&self, offset: usize) -> BinaryResult<&[u8]> {
        let range = self.range(offset, 0)?;
        let tail = &self.data[range.start..];
        let end = memchr(0, tail).ok_or(BinaryError::MissingTerminator { offset })?;
        Ok(&tail[..end])
    }

    /// Up to `max_len` bytes of text, stopping at the first control character.
    ///
    /// Only the bytes up to the terminator need to exist. Running out of buffer
    /// before both a terminator and `max_len` is an error.
    pub fn text_at_most(&self, offset: usize, max_len: usize) -> BinaryResult<String> {
        let range = self.range(offset, 0)?;
        let tail = &self.data[range.start..];
        let window = &tail[..max_len.min(tail.len())];
        match window.iter().position(|&b| b < 0x20) {
            Some(end) => Ok(decode_text(&window[..end])),
            None if window.len() == max_len => Ok(decode_text(window)),
            None => Err(BinaryError::InsufficientData {
                offset,
                expected: max_len,
                available: tail.len(),
            }),
        }
    }

    /// Owned handle to `length` bytes starting at `offset`.
    ///
    /// The returned buffer shares storage with the view; it stays valid after the
    /// view is dropped.
    pub fn slice(&self, offset: usize, length: usize) -> BinaryResult<Bytes> {
        let range = self.range(offset, length)?;
        Ok(self.data.slice(range))
    }
}

//! Bounds-checked, word-addressed view over an ABI buffer.
//!
//! Every offset and length read from the buffer is untrusted: all position
//! arithmetic is checked, and an overflowing position is reported as
//! truncation rather than wrapping.

use crate::error::AbiError;
use crate::types::WORD_SIZE;

/// One 32-byte ABI word.
pub type Word = [u8; WORD_SIZE];

/// Immutable view over a caller-owned buffer.
#[derive(Debug, Clone, Copy)]
pub struct WordReader<'a> {
    buf: &'a [u8],
}

impl<'a> WordReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn truncated(&self, offset: usize, needed: usize) -> AbiError {
        AbiError::Truncated {
            offset,
            needed,
            available: self.buf.len(),
        }
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], AbiError> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| self.truncated(offset, len))?;
        self.buf
            .get(offset..end)
            .ok_or_else(|| self.truncated(offset, len))
    }

    /// Fail unless `[offset, offset + len)` lies inside the buffer.
    pub fn ensure(&self, offset: usize, len: usize) -> Result<(), AbiError> {
        self.slice(offset, len).map(|_| ())
    }

    /// Read the word at `offset`.
    pub fn read_word(&self, offset: usize) -> Result<&'a Word, AbiError> {
        self.slice(offset, WORD_SIZE)?
            .try_into()
            .map_err(|_| self.truncated(offset, WORD_SIZE))
    }

    /// Read the word at `offset` as a byte count or position.
    ///
    /// A value that does not fit in `usize` cannot address anything inside
    /// the buffer, so it is reported as truncation.
    pub fn read_usize(&self, offset: usize) -> Result<usize, AbiError> {
        let word = self.read_word(offset)?;
        word_to_usize(word).ok_or_else(|| self.truncated(offset, usize::MAX))
    }

    /// Read a length word at `offset` and return `(length, first_data_byte)`.
    ///
    /// The data region, padded up to a whole number of words, must lie
    /// inside the buffer.
    pub fn read_length_prefixed(&self, offset: usize) -> Result<(usize, usize), AbiError> {
        let length = self.read_usize(offset)?;
        let data = offset + WORD_SIZE;
        let padded = padded_len(length).ok_or_else(|| self.truncated(data, length))?;
        self.ensure(data, padded)?;
        Ok((length, data))
    }
}

/// Interpret a big-endian word as `usize` if it fits.
pub fn word_to_usize(word: &Word) -> Option<usize> {
    let (high, low) = word.split_at(WORD_SIZE - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let mut be = [0u8; 8];
    be.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(be)).ok()
}

/// `len` rounded up to a multiple of the word size.
pub fn padded_len(len: usize) -> Option<usize> {
    len.checked_add(WORD_SIZE - 1)
        .map(|n| n / WORD_SIZE * WORD_SIZE)
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Zero-copy read cursor over a frame.

use ironiso_core::PackError;

/// Forward-only cursor handing out slices of the input buffer.
///
/// Every read names the field position it serves, so a short buffer
/// surfaces as `PackError::Truncated` pointing at the field.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    /// Input buffer.
    input: &'a [u8],
    /// Current position in the buffer.
    offset: usize,
}

impl<'a> FieldReader<'a> {
    /// Creates a reader at the start of `input`.
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Takes the next `count` bytes.
    ///
    /// # Errors
    /// Returns `PackError::Truncated` if fewer than `count` bytes remain.
    pub fn take(&mut self, position: u16, count: usize) -> Result<&'a [u8], PackError> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(PackError::Truncated {
                position,
                needed: count,
                available: remaining,
            });
        }
        let slice = &self.input[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    /// Returns the current offset.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of unread bytes.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.input.len() - self.offset
    }

    /// Returns true if every byte has been read.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails with `PackError::TrailingBytes` unless every byte has been read.
    ///
    /// # Errors
    /// Returns `PackError::TrailingBytes` with the unread count.
    pub fn finish(&self) -> Result<(), PackError> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(PackError::TrailingBytes { count }),
        }
    }
}

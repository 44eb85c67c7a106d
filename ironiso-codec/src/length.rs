/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Length and digit encodings.
//!
//! Three ways of writing a number appear on the ISO 8583 wire:
//! - decimal characters, left-padded with `0` (character codecs)
//! - packed BCD, two digits per byte, left-padded with a zero nibble
//! - big-endian binary (frame length prefix of binary codecs)
//!
//! [`LengthPrefix`] applies the frame length convention of a protocol schema.

use crate::reader::FieldReader;
use bytes::BufMut;
use ironiso_core::PackError;
use ironiso_schema::{MessageCodec, ProtocolSchema};

/// Returns the largest value `digits` decimal digits can hold.
#[inline]
#[must_use]
pub fn decimal_max(digits: u8) -> u64 {
    10u64.saturating_pow(u32::from(digits)) - 1
}

/// Writes `value` as exactly `digits` decimal characters.
///
/// # Errors
/// Returns `PackError::LengthOverflow` if the value needs more digits.
pub fn put_decimal<B: BufMut>(out: &mut B, value: usize, digits: u8) -> Result<(), PackError> {
    let max = decimal_max(digits);
    if value as u64 > max {
        return Err(PackError::LengthOverflow {
            length: value,
            max: max as usize,
        });
    }
    let mut buf = itoa::Buffer::new();
    let text = buf.format(value);
    for _ in text.len()..usize::from(digits) {
        out.put_u8(b'0');
    }
    out.put_slice(text.as_bytes());
    Ok(())
}

/// Parses decimal characters.
///
/// # Returns
/// `None` if any byte is not a digit or the input is empty.
#[must_use]
pub fn parse_decimal(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }
    bytes.iter().try_fold(0usize, |acc, b| {
        let digit = b.checked_sub(b'0').filter(|d| *d <= 9)?;
        acc.checked_mul(10)?.checked_add(usize::from(digit))
    })
}

/// Returns the number of bytes needed to pack `digits` BCD digits.
#[inline]
#[must_use]
pub const fn bcd_len(digits: usize) -> usize {
    digits.div_ceil(2)
}

/// Packs decimal digit characters as BCD, left-padding to an even count.
///
/// # Errors
/// Returns `PackError::InvalidFieldValue` if `digits` holds a non-digit.
pub fn put_bcd<B: BufMut>(out: &mut B, digits: &[u8], position: u16) -> Result<(), PackError> {
    if let Some(bad) = digits.iter().find(|b| !b.is_ascii_digit()) {
        return Err(PackError::InvalidFieldValue {
            position,
            reason: format!("'{}' is not a decimal digit", char::from(*bad)),
        });
    }
    let pad = digits.len() % 2;
    let mut nibbles = std::iter::repeat_n(0u8, pad).chain(digits.iter().map(|d| d - b'0'));
    while let (Some(high), Some(low)) = (nibbles.next(), nibbles.next()) {
        out.put_u8((high << 4) | low);
    }
    Ok(())
}

/// Unpacks BCD bytes into `digits` decimal characters, dropping the left pad.
///
/// # Returns
/// `None` if a nibble is above 9 or the pad nibble is not zero.
#[must_use]
pub fn parse_bcd(bytes: &[u8], digits: usize) -> Option<String> {
    let mut text = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        for nibble in [byte >> 4, byte & 0x0F] {
            if nibble > 9 {
                return None;
            }
            text.push(char::from(b'0' + nibble));
        }
    }
    let pad = text.len().checked_sub(digits)?;
    if text[..pad].bytes().any(|b| b != b'0') {
        return None;
    }
    Some(text.split_off(pad))
}

/// Frame length prefix of a protocol schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPrefix {
    codec: MessageCodec,
    digits: u8,
}

impl LengthPrefix {
    /// Creates a length prefix.
    ///
    /// # Arguments
    /// * `codec` - `Ascii` for decimal characters, `Binary` for big-endian bytes
    /// * `digits` - Number of characters or bytes
    #[must_use]
    pub const fn new(codec: MessageCodec, digits: u8) -> Self {
        Self { codec, digits }
    }

    /// Creates the length prefix a protocol schema declares.
    #[must_use]
    pub fn from_schema(schema: &ProtocolSchema) -> Self {
        Self::new(schema.codec(), schema.length_digits())
    }

    /// Returns the width of the prefix in bytes.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.digits as usize
    }

    /// Returns the largest encodable length.
    #[must_use]
    pub fn max(&self) -> usize {
        let max = match self.codec {
            MessageCodec::Ascii => decimal_max(self.digits),
            MessageCodec::Binary => (1u64 << (8 * u32::from(self.digits.min(4)))) - 1,
        };
        usize::try_from(max).unwrap_or(usize::MAX)
    }

    /// Writes `length` as a prefix.
    ///
    /// # Errors
    /// Returns `PackError::LengthOverflow` if the length does not fit.
    pub fn encode<B: BufMut>(&self, length: usize, out: &mut B) -> Result<(), PackError> {
        if length > self.max() {
            return Err(PackError::LengthOverflow {
                length,
                max: self.max(),
            });
        }
        match self.codec {
            MessageCodec::Ascii => put_decimal(out, length, self.digits),
            MessageCodec::Binary => {
                let bytes = (length as u64).to_be_bytes();
                out.put_slice(&bytes[bytes.len() - self.width()..]);
                Ok(())
            }
        }
    }

    /// Parses a prefix from the start of `bytes`.
    ///
    /// # Returns
    /// `Ok(None)` if fewer than [`width`](Self::width) bytes are available.
    ///
    /// # Errors
    /// Returns `PackError::InvalidLengthPrefix` for non-digit characters.
    pub fn peek(&self, bytes: &[u8]) -> Result<Option<usize>, PackError> {
        let Some(prefix) = bytes.get(..self.width()) else {
            return Ok(None);
        };
        match self.codec {
            MessageCodec::Ascii => parse_decimal(prefix).map(Some).ok_or_else(|| {
                PackError::InvalidLengthPrefix(format!(
                    "expected {} decimal digits, found {:?}",
                    self.digits,
                    String::from_utf8_lossy(prefix)
                ))
            }),
            MessageCodec::Binary => Ok(Some(
                prefix
                    .iter()
                    .fold(0usize, |acc, b| (acc << 8) | usize::from(*b)),
            )),
        }
    }

    /// Reads a prefix from a reader.
    ///
    /// # Errors
    /// Returns `PackError::Truncated` or `PackError::InvalidLengthPrefix`.
    pub fn decode(&self, reader: &mut FieldReader<'_>) -> Result<usize, PackError> {
        let prefix = reader.take(0, self.width())?;
        self.peek(prefix)?
            .ok_or_else(|| PackError::InvalidLengthPrefix("empty prefix".to_string()))
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Core types shared across the IronIso crates:
//! - [`Charset`]: single-byte character encodings for text fields
//! - [`Direction`]: whether a message was received or is being sent
//! - [`Stan`]: systems trace audit number (field 11)

use arrayvec::ArrayString;
use bytes::BufMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest systems trace audit number.
pub const STAN_MAX: u32 = 999_999;

/// Character encoding for text fields.
///
/// Both encodings are single-byte, so a field length in characters equals
/// its length in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Charset {
    /// 7-bit US-ASCII.
    Ascii,
    /// ISO-8859-1 (Latin-1).
    #[default]
    Latin1,
}

impl Charset {
    /// Returns the canonical name of this encoding.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascii => "US-ASCII",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    /// Returns the highest code point the encoding represents.
    #[inline]
    const fn max_code_point(self) -> u32 {
        match self {
            Self::Ascii => 0x7F,
            Self::Latin1 => 0xFF,
        }
    }

    /// Encodes `text` into `out`.
    ///
    /// # Errors
    /// Returns the first character that cannot be represented.
    pub fn encode_into<B: BufMut>(self, text: &str, out: &mut B) -> Result<(), char> {
        let max = self.max_code_point();
        for c in text.chars() {
            let code = u32::from(c);
            if code > max {
                return Err(c);
            }
            out.put_u8(code as u8);
        }
        Ok(())
    }

    /// Decodes `bytes` into a string.
    ///
    /// # Errors
    /// Returns the first byte that is not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Result<String, u8> {
        let max = self.max_code_point();
        bytes
            .iter()
            .map(|b| {
                if u32::from(*b) > max {
                    Err(*b)
                } else {
                    Ok(char::from(*b))
                }
            })
            .collect()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of a message relative to this endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Received from the counterparty.
    Inbound,
    /// Created locally for sending.
    #[default]
    Outbound,
}

/// Systems trace audit number (field 11).
///
/// Valid values are 1 through [`STAN_MAX`]; the successor of the maximum
/// wraps back to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Stan(u32);

impl Stan {
    /// Creates a trace number, wrapping values outside `1..=STAN_MAX`.
    ///
    /// # Arguments
    /// * `value` - The raw value
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        let max = STAN_MAX as u64;
        Self(((value as u64 + max - 1) % max) as u32 + 1)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the next trace number.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        if self.0 >= STAN_MAX {
            Self(1)
        } else {
            Self(self.0 + 1)
        }
    }

    /// Formats the trace number as six zero-padded digits.
    #[must_use]
    pub fn format(self) -> ArrayString<6> {
        let mut out = ArrayString::new();
        let mut buffer = itoa::Buffer::new();
        let digits = buffer.format(self.0);
        for _ in digits.len()..6 {
            out.push('0');
        }
        out.push_str(digits);
        out
    }
}

impl Default for Stan {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Stan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_latin1_round_trip() {
        let mut out = BytesMut::new();
        Charset::Latin1.encode_into("café", &mut out).unwrap();
        assert_eq!(&out[..], &[b'c', b'a', b'f', 0xE9]);
        assert_eq!(Charset::Latin1.decode(&out).unwrap(), "café");
    }

    #[test]
    fn test_ascii_rejects_high_characters() {
        let mut out = BytesMut::new();
        assert_eq!(Charset::Ascii.encode_into("é", &mut out), Err('é'));
        assert_eq!(Charset::Ascii.decode(&[0x41, 0xE9]), Err(0xE9));
        assert_eq!(
            Charset::Latin1.encode_into("€", &mut BytesMut::new()),
            Err('€')
        );
    }

    #[test]
    fn test_stan_wraps() {
        assert_eq!(Stan::new(STAN_MAX).next().value(), 1);
        assert_eq!(Stan::new(0).value(), STAN_MAX);
        assert_eq!(Stan::new(1_000_000).value(), 1);
        assert_eq!(Stan::new(42).next().value(), 43);
    }

    #[test]
    fn test_stan_format() {
        assert_eq!(Stan::new(7).to_string(), "000007");
        assert_eq!(Stan::new(STAN_MAX).format().as_str(), "999999");
    }
}

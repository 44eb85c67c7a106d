/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field presence bitmap.
//!
//! Bits are numbered from zero starting at the most significant bit of the
//! first byte. Which bit marks which field is decided by the protocol schema;
//! this type only stores bits.

use smallvec::SmallVec;
use std::fmt;

/// MSB-first bit set backed by whole bytes.
///
/// A primary plus secondary ISO bitmap (16 bytes) fits inline.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bitmap {
    bytes: SmallVec<[u8; 16]>,
}

impl Bitmap {
    /// Creates an all-zero bitmap of `len_bytes` bytes.
    #[must_use]
    pub fn new(len_bytes: usize) -> Self {
        Self {
            bytes: SmallVec::from_elem(0, len_bytes),
        }
    }

    /// Creates a bitmap from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
        }
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the width in bytes.
    #[inline]
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the width in bits.
    #[inline]
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Returns true if no bit is set.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Returns the bit at `index`; bits past the end read as unset.
    #[inline]
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        self.bytes
            .get(index / 8)
            .is_some_and(|byte| byte & (0x80 >> (index % 8)) != 0)
    }

    /// Sets the bit at `index`, widening the bitmap if needed.
    pub fn set(&mut self, index: usize) {
        let byte = index / 8;
        if byte >= self.bytes.len() {
            self.bytes.resize(byte + 1, 0);
        }
        self.bytes[byte] |= 0x80 >> (index % 8);
    }

    /// Clears the bit at `index`.
    pub fn clear(&mut self, index: usize) {
        if let Some(byte) = self.bytes.get_mut(index / 8) {
            *byte &= !(0x80 >> (index % 8));
        }
    }

    /// Appends the bytes of another bitmap, e.g. a secondary bitmap.
    pub fn extend(&mut self, other: &Self) {
        self.bytes.extend_from_slice(&other.bytes);
    }

    /// Returns the indices of all set bits in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.bit_len()).filter(|i| self.is_set(*i))
    }

    /// Returns the index of the highest set bit.
    #[must_use]
    pub fn highest_set(&self) -> Option<usize> {
        (0..self.bit_len()).rev().find(|i| self.is_set(*i))
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({})", hex::encode_upper(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first() {
        let mut bitmap = Bitmap::new(2);
        bitmap.set(0);
        bitmap.set(9);
        assert_eq!(bitmap.as_bytes(), &[0x80, 0x40]);
        assert!(bitmap.is_set(0));
        assert!(bitmap.is_set(9));
        assert!(!bitmap.is_set(1));
        assert!(!bitmap.is_set(200));
    }

    #[test]
    fn test_set_widens() {
        let mut bitmap = Bitmap::default();
        assert!(bitmap.is_clear());
        bitmap.set(20);
        assert_eq!(bitmap.len_bytes(), 3);
        assert_eq!(bitmap.highest_set(), Some(20));
    }

    #[test]
    fn test_clear_and_iter() {
        let mut bitmap = Bitmap::from_bytes(&[0xF0]);
        bitmap.clear(1);
        assert_eq!(bitmap.iter_set().collect::<Vec<_>>(), vec![0, 2, 3]);
    }

    #[test]
    fn test_extend_secondary() {
        let mut primary = Bitmap::from_bytes(&[0x80]);
        primary.extend(&Bitmap::from_bytes(&[0x01]));
        assert_eq!(primary.iter_set().collect::<Vec<_>>(), vec![0, 15]);
    }
}

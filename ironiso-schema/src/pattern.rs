/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message type patterns.
//!
//! A pattern is four characters, each a decimal digit or the `*` wildcard.
//! `"08**"` matches every network management type of version 1987, and
//! `"****"` matches every type.

use ironiso_core::{MTI_LENGTH, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Wildcard character.
pub const WILDCARD: u8 = b'*';

/// Four-character message type pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypePattern([u8; MTI_LENGTH]);

impl TypePattern {
    /// The universal fallback pattern `****`.
    pub const ANY: Self = Self([WILDCARD; MTI_LENGTH]);

    /// Parses a pattern.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidTypePattern` unless the input is four
    /// characters, each a digit or `*`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let bytes = input.as_bytes();
        let valid = bytes.len() == MTI_LENGTH
            && bytes.iter().all(|b| b.is_ascii_digit() || *b == WILDCARD);
        if !valid {
            return Err(ValidationError::InvalidTypePattern(input.to_string()));
        }
        let mut pattern = [0u8; MTI_LENGTH];
        pattern.copy_from_slice(bytes);
        Ok(Self(pattern))
    }

    /// Returns true if the pattern matches the 4-character type.
    #[must_use]
    pub fn matches(&self, mti: &str) -> bool {
        let mti = mti.as_bytes();
        mti.len() == MTI_LENGTH
            && self
                .0
                .iter()
                .zip(mti)
                .all(|(p, c)| *p == WILDCARD || p == c)
    }

    /// Returns the number of non-wildcard characters.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.0.iter().filter(|b| **b != WILDCARD).count()
    }

    /// Returns true if the pattern has no wildcard.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.specificity() == MTI_LENGTH
    }

    /// Returns the pattern as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("****")
    }
}

impl FromStr for TypePattern {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TypePattern {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypePattern> for String {
    fn from(pattern: TypePattern) -> Self {
        pattern.as_str().to_string()
    }
}

impl fmt::Display for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves `mti` against a pattern-keyed map.
///
/// An exact entry wins. Otherwise the matching pattern with the fewest
/// wildcards is chosen; ties go to the lowest pattern in map order.
#[must_use]
pub fn resolve<'a, T>(entries: &'a BTreeMap<TypePattern, T>, mti: &str) -> Option<&'a T> {
    if let Ok(exact) = TypePattern::parse(mti)
        && exact.is_exact()
        && let Some(entry) = entries.get(&exact)
    {
        return Some(entry);
    }
    entries
        .iter()
        .filter(|(pattern, _)| pattern.matches(mti))
        .fold(None::<(&TypePattern, &T)>, |best, (pattern, entry)| match best {
            Some((current, _)) if current.specificity() >= pattern.specificity() => best,
            _ => Some((pattern, entry)),
        })
        .map(|(_, entry)| entry)
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field values for ISO 8583 messages.
//!
//! This module provides:
//! - [`FieldValue`]: the decoded value of a primitive field
//! - [`Field`]: a primitive value or an ordered list of sub-fields
//! - [`SubFields`]: positional sub-field slots of a compound field

use crate::bitmap::Bitmap;
use crate::error::PackError;
use crate::mti::MessageType;
use bytes::Bytes;
use std::fmt;

/// Highest addressable sub-field position.
pub const MAX_SUBFIELD_POSITION: u16 = 999;

/// Value carried by a primitive field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Character data (ALPHA, NUMERIC and the VAR family).
    Text(String),
    /// Raw bytes (BINARY and the BIN family).
    Binary(Bytes),
    /// Presence bitmap.
    Bitmap(Bitmap),
    /// Message type indicator.
    MessageType(MessageType),
}

impl FieldValue {
    /// Returns the value as a string slice, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as bytes, if it is binary.
    #[must_use]
    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the bitmap, if this is a bitmap value.
    #[must_use]
    pub const fn as_bitmap(&self) -> Option<&Bitmap> {
        match self {
            Self::Bitmap(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the message type, if this is a type value.
    #[must_use]
    pub const fn as_message_type(&self) -> Option<&MessageType> {
        match self {
            Self::MessageType(t) => Some(t),
            _ => None,
        }
    }

    /// Returns a short name for the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
            Self::Bitmap(_) => "bitmap",
            Self::MessageType(_) => "message type",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Binary(b) => f.write_str(&hex::encode_upper(b)),
            Self::Bitmap(b) => f.write_str(&hex::encode_upper(b.as_bytes())),
            Self::MessageType(t) => write!(f, "{t}"),
        }
    }
}

/// A message field: an atomic value or a list of sub-fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Atomic value.
    Primitive(FieldValue),
    /// Composite or constructed field.
    Composite(SubFields),
}

impl Field {
    /// Creates a text field.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Primitive(FieldValue::Text(value.into()))
    }

    /// Creates a binary field.
    #[must_use]
    pub fn binary(value: impl Into<Bytes>) -> Self {
        Self::Primitive(FieldValue::Binary(value.into()))
    }

    /// Returns the primitive value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&FieldValue> {
        match self {
            Self::Primitive(v) => Some(v),
            Self::Composite(_) => None,
        }
    }

    /// Returns the text value of a primitive text field.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value().and_then(FieldValue::as_text)
    }

    /// Returns the bytes of a primitive binary field.
    #[must_use]
    pub fn as_binary(&self) -> Option<&Bytes> {
        self.value().and_then(FieldValue::as_binary)
    }

    /// Returns the sub-fields of a compound field.
    #[must_use]
    pub const fn sub_fields(&self) -> Option<&SubFields> {
        match self {
            Self::Composite(s) => Some(s),
            Self::Primitive(_) => None,
        }
    }

    /// Returns true if this is a compound field.
    #[inline]
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}

impl From<FieldValue> for Field {
    fn from(value: FieldValue) -> Self {
        Self::Primitive(value)
    }
}

impl From<SubFields> for Field {
    fn from(value: SubFields) -> Self {
        Self::Composite(value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(v) => write!(f, "{v}"),
            Self::Composite(subs) => {
                f.write_str("[")?;
                for (i, (position, field)) in subs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{position}={field}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Positional sub-field slots of a compound field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubFields {
    slots: Vec<Option<Field>>,
}

impl SubFields {
    /// Creates an empty sub-field list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check(position: u16) -> Result<usize, PackError> {
        if position > MAX_SUBFIELD_POSITION {
            return Err(PackError::PositionOutOfRange {
                position,
                min: 0,
                max: MAX_SUBFIELD_POSITION,
            });
        }
        Ok(usize::from(position))
    }

    /// Adds a sub-field, builder style.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `0..=999`.
    pub fn with(mut self, position: u16, field: Field) -> Result<Self, PackError> {
        self.set(position, field)?;
        Ok(self)
    }

    /// Sets a sub-field.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `0..=999`.
    pub fn set(&mut self, position: u16, field: Field) -> Result<(), PackError> {
        let index = Self::check(position)?;
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(field);
        Ok(())
    }

    /// Returns a sub-field.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `0..=999`.
    pub fn get(&self, position: u16) -> Result<Option<&Field>, PackError> {
        let index = Self::check(position)?;
        Ok(self.slots.get(index).and_then(Option::as_ref))
    }

    /// Removes and returns a sub-field.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `0..=999`.
    pub fn remove(&mut self, position: u16) -> Result<Option<Field>, PackError> {
        let index = Self::check(position)?;
        Ok(self.slots.get_mut(index).and_then(Option::take))
    }

    /// Iterates present sub-fields in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Field)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|f| (i as u16, f)))
    }

    /// Returns the number of present sub-fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns true if no sub-field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_accessors() {
        let field = Field::text("123456");
        assert_eq!(field.as_text(), Some("123456"));
        assert!(field.as_binary().is_none());
        assert!(!field.is_composite());

        let field = Field::binary(vec![0xDE, 0xAD]);
        assert_eq!(field.to_string(), "DEAD");
    }

    #[test]
    fn test_sub_fields_positions() {
        let subs = SubFields::new()
            .with(3, Field::text("c"))
            .unwrap()
            .with(1, Field::text("a"))
            .unwrap();
        let positions: Vec<u16> = subs.iter().map(|(p, _)| p).collect();
        assert_eq!(positions, vec![1, 3]);
        assert_eq!(subs.len(), 2);
        assert!(subs.get(2).unwrap().is_none());
        assert_eq!(
            subs.get(1000),
            Err(PackError::PositionOutOfRange {
                position: 1000,
                min: 0,
                max: 999
            })
        );
    }

    #[test]
    fn test_nested_composite_display() {
        let inner = SubFields::new().with(1, Field::text("x")).unwrap();
        let outer = SubFields::new()
            .with(1, Field::Composite(inner))
            .unwrap()
            .with(2, Field::text("y"))
            .unwrap();
        assert_eq!(Field::Composite(outer).to_string(), "[1=[1=x], 2=y]");
    }

    #[test]
    fn test_remove_sub_field() {
        let mut subs = SubFields::new().with(5, Field::text("v")).unwrap();
        assert_eq!(subs.remove(5).unwrap(), Some(Field::text("v")));
        assert!(subs.is_empty());
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field and message schema definitions.
//!
//! This module defines the structures that describe an ISO 8583 message layout:
//! - [`ValueType`]: how a primitive value is laid out on the wire
//! - [`FieldType`]: whether a field is atomic or holds sub-fields
//! - [`FieldSchema`]: value type, length and optional sub-fields of a position
//! - [`MessageSchema`]: field schemas for positions 0 through 128
//!
//! Builders collect positions in sparse maps and produce dense arrays, so
//! positions may be added in any order.

use crate::validate::validate_field;
use ironiso_core::{MAX_FIELD_POSITION, MAX_SUBFIELD_POSITION, PackError, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum declared field length.
pub const MIN_FIELD_LENGTH: u16 = 1;

/// Maximum declared field length.
pub const MAX_FIELD_LENGTH: u16 = 999;

/// Wire layout of a primitive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Message type indicator.
    MessageType,
    /// Presence bitmap.
    Bitmap,
    /// Fixed-length alphanumeric, right-padded with blanks.
    Alpha,
    /// Fixed-length numeric, left-padded with zeros.
    Numeric,
    /// Characters with a 2-digit length prefix.
    LlVar,
    /// Characters with a 3-digit length prefix.
    LllVar,
    /// Characters with a 4-digit length prefix.
    LlllVar,
    /// Fixed-length raw bytes.
    Binary,
    /// Bytes with a 2-digit length prefix.
    LlBin,
    /// Bytes with a 3-digit length prefix.
    LllBin,
    /// Bytes with a 4-digit length prefix.
    LlllBin,
}

impl ValueType {
    /// Returns the canonical name of the value type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MessageType => "MESSAGE_TYPE",
            Self::Bitmap => "BITMAP",
            Self::Alpha => "ALPHA",
            Self::Numeric => "NUMERIC",
            Self::LlVar => "LLVAR",
            Self::LllVar => "LLLVAR",
            Self::LlllVar => "LLLLVAR",
            Self::Binary => "BINARY",
            Self::LlBin => "LLBIN",
            Self::LllBin => "LLLBIN",
            Self::LlllBin => "LLLLBIN",
        }
    }

    /// Returns the number of length-prefix digits for variable types.
    #[must_use]
    pub const fn prefix_digits(self) -> Option<u8> {
        match self {
            Self::LlVar | Self::LlBin => Some(2),
            Self::LllVar | Self::LllBin => Some(3),
            Self::LlllVar | Self::LlllBin => Some(4),
            _ => None,
        }
    }

    /// Returns true for the length-prefixed types.
    #[inline]
    #[must_use]
    pub const fn is_variable(self) -> bool {
        self.prefix_digits().is_some()
    }

    /// Returns true for types whose payload is raw bytes.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Binary | Self::LlBin | Self::LllBin | Self::LlllBin
        )
    }

    /// Returns the largest length this type can declare.
    #[must_use]
    pub const fn max_length(self) -> u16 {
        match self.prefix_digits() {
            Some(2) => 99,
            _ => MAX_FIELD_LENGTH,
        }
    }

    /// Returns true if a compound field may use this type as its envelope.
    #[must_use]
    pub const fn can_wrap_sub_fields(self) -> bool {
        !matches!(self, Self::MessageType | Self::Bitmap)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ValueType {
    type Err = ValidationError;

    /// Parses a value type from its canonical name.
    ///
    /// # Arguments
    /// * `s` - The type name, case-insensitive (e.g. "llvar")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "MESSAGE_TYPE" | "MTI" => Self::MessageType,
            "BITMAP" => Self::Bitmap,
            "ALPHA" => Self::Alpha,
            "NUMERIC" => Self::Numeric,
            "LLVAR" => Self::LlVar,
            "LLLVAR" => Self::LllVar,
            "LLLLVAR" => Self::LlllVar,
            "BINARY" => Self::Binary,
            "LLBIN" => Self::LlBin,
            "LLLBIN" => Self::LllBin,
            "LLLLBIN" => Self::LlllBin,
            other => {
                return Err(ValidationError::Configuration(format!(
                    "unknown value type '{other}'"
                )));
            }
        })
    }
}

/// Structural kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldType {
    /// Atomic value.
    #[default]
    Primitive,
    /// Every declared sub-field, in order.
    Composite,
    /// A sub-field bitmap followed by the present sub-fields.
    Constructed,
}

impl FieldType {
    /// Returns true for composite and constructed fields.
    #[inline]
    #[must_use]
    pub const fn is_compound(self) -> bool {
        !matches!(self, Self::Primitive)
    }
}

/// Schema of one field position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    field_type: FieldType,
    value_type: ValueType,
    length: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    codec: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_fields: Vec<Option<FieldSchema>>,
}

impl FieldSchema {
    /// Starts a primitive field schema.
    ///
    /// # Arguments
    /// * `value_type` - Wire layout of the value
    /// * `length` - Fixed length, or maximum length for variable types
    #[must_use]
    pub fn primitive(value_type: ValueType, length: u16) -> FieldSchemaBuilder {
        FieldSchemaBuilder::new()
            .field_type(FieldType::Primitive)
            .value_type(value_type)
            .length(length)
    }

    /// Starts a composite field schema wrapped in `value_type`.
    #[must_use]
    pub fn composite(value_type: ValueType, length: u16) -> FieldSchemaBuilder {
        FieldSchemaBuilder::new()
            .field_type(FieldType::Composite)
            .value_type(value_type)
            .length(length)
    }

    /// Starts a constructed field schema wrapped in `value_type`.
    #[must_use]
    pub fn constructed(value_type: ValueType, length: u16) -> FieldSchemaBuilder {
        FieldSchemaBuilder::new()
            .field_type(FieldType::Constructed)
            .value_type(value_type)
            .length(length)
    }

    /// Schema applied to position 0 when a message schema omits it.
    #[must_use]
    pub fn default_message_type() -> Self {
        Self::bare(ValueType::MessageType, 4)
    }

    /// Schema applied to position 1 when a message schema omits it.
    #[must_use]
    pub fn default_bitmap() -> Self {
        Self::bare(ValueType::Bitmap, 16)
    }

    fn bare(value_type: ValueType, length: u16) -> Self {
        Self {
            field_type: FieldType::Primitive,
            value_type,
            length,
            default_value: None,
            name: None,
            description: None,
            codec: None,
            sub_fields: Vec::new(),
        }
    }

    /// Returns the field type.
    #[inline]
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the value type.
    #[inline]
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns the fixed or maximum length.
    #[inline]
    #[must_use]
    pub const fn length(&self) -> u16 {
        self.length
    }

    /// Returns the default value sent when the message omits the field.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the field description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the dedicated field codec identifier, if any.
    #[must_use]
    pub fn codec(&self) -> Option<&str> {
        self.codec.as_deref()
    }

    /// Returns the schema of a sub-field.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `0..=999`.
    pub fn sub_field(&self, position: u16) -> Result<Option<&FieldSchema>, PackError> {
        if position > MAX_SUBFIELD_POSITION {
            return Err(PackError::PositionOutOfRange {
                position,
                min: 0,
                max: MAX_SUBFIELD_POSITION,
            });
        }
        Ok(self
            .sub_fields
            .get(usize::from(position))
            .and_then(Option::as_ref))
    }

    /// Iterates declared sub-fields in ascending position order.
    pub fn sub_fields(&self) -> impl Iterator<Item = (u16, &FieldSchema)> + '_ {
        self.sub_fields
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i as u16, s)))
    }

    /// Returns the highest declared sub-field position.
    #[must_use]
    pub fn highest_sub_field(&self) -> Option<u16> {
        self.sub_fields().map(|(p, _)| p).last()
    }
}

/// Builder for [`FieldSchema`].
#[derive(Debug, Clone, Default)]
pub struct FieldSchemaBuilder {
    field_type: Option<FieldType>,
    value_type: Option<ValueType>,
    length: Option<u16>,
    default_value: Option<String>,
    name: Option<String>,
    description: Option<String>,
    codec: Option<String>,
    sub_fields: BTreeMap<u16, FieldSchemaBuilder>,
}

impl FieldSchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field type.
    #[must_use]
    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Sets the value type.
    #[must_use]
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Sets the fixed or maximum length.
    #[must_use]
    pub fn length(mut self, length: u16) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the field name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the field description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Names a dedicated field codec for this field.
    #[must_use]
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    /// Adds a sub-field schema. A later call for the same position replaces
    /// the earlier one.
    #[must_use]
    pub fn sub_field(mut self, position: u16, field: FieldSchemaBuilder) -> Self {
        self.sub_fields.insert(position, field);
        self
    }

    /// Builds and validates the schema for `position`.
    ///
    /// # Errors
    /// Returns a `ValidationError` if a type is missing, a length or position
    /// is out of range, or the sub-field structure is inconsistent.
    pub fn build(self, position: u16) -> Result<FieldSchema, ValidationError> {
        let field_type = self
            .field_type
            .ok_or(ValidationError::MissingFieldType { position })?;
        let value_type = self
            .value_type
            .ok_or(ValidationError::MissingValueType { position })?;
        let length = self.length.unwrap_or(0);

        let mut sub_fields = Vec::new();
        if let Some(highest) = self.sub_fields.keys().next_back() {
            if *highest > MAX_SUBFIELD_POSITION {
                return Err(ValidationError::InvalidPosition {
                    position: *highest,
                    min: 0,
                    max: MAX_SUBFIELD_POSITION,
                });
            }
            sub_fields.resize(usize::from(*highest) + 1, None);
        }
        for (sub_position, builder) in self.sub_fields {
            sub_fields[usize::from(sub_position)] = Some(builder.build(sub_position)?);
        }

        let schema = FieldSchema {
            field_type,
            value_type,
            length,
            default_value: self.default_value,
            name: self.name,
            description: self.description,
            codec: self.codec,
            sub_fields,
        };
        validate_field(position, &schema)?;
        Ok(schema)
    }
}

/// Schema of a message: one optional field schema per position 0 to 128.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    fields: Vec<Option<FieldSchema>>,
}

impl MessageSchema {
    /// Starts a message schema.
    #[must_use]
    pub fn builder() -> MessageSchemaBuilder {
        MessageSchemaBuilder::default()
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the field schema at `position`.
    ///
    /// # Returns
    /// `Ok(None)` for an in-range position without a declared schema.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `0..=128`.
    pub fn field(&self, position: u16) -> Result<Option<&FieldSchema>, PackError> {
        if position > MAX_FIELD_POSITION {
            return Err(PackError::PositionOutOfRange {
                position,
                min: 0,
                max: MAX_FIELD_POSITION,
            });
        }
        Ok(self.fields.get(usize::from(position)).and_then(Option::as_ref))
    }

    /// Iterates declared field schemas in ascending position order.
    pub fn fields(&self) -> impl Iterator<Item = (u16, &FieldSchema)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i as u16, s)))
    }

    /// Returns the highest declared position, or `None` for an empty schema.
    #[must_use]
    pub fn highest_position(&self) -> Option<u16> {
        self.fields().map(|(p, _)| p).last()
    }
}

/// Builder for [`MessageSchema`].
#[derive(Debug, Clone, Default)]
pub struct MessageSchemaBuilder {
    name: Option<String>,
    fields: BTreeMap<u16, FieldSchemaBuilder>,
}

impl MessageSchemaBuilder {
    /// Sets the schema name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a field schema. A later call for the same position replaces the
    /// earlier one.
    #[must_use]
    pub fn field(mut self, position: u16, field: FieldSchemaBuilder) -> Self {
        self.fields.insert(position, field);
        self
    }

    /// Builds and validates the message schema.
    ///
    /// # Errors
    /// Returns a `ValidationError` for a position above 128 or any invalid
    /// field schema.
    pub fn build(self) -> Result<MessageSchema, ValidationError> {
        let mut fields = Vec::new();
        if let Some(highest) = self.fields.keys().next_back() {
            if *highest > MAX_FIELD_POSITION {
                return Err(ValidationError::InvalidPosition {
                    position: *highest,
                    min: 0,
                    max: MAX_FIELD_POSITION,
                });
            }
            fields.resize(usize::from(*highest) + 1, None);
        }
        for (position, builder) in self.fields {
            fields[usize::from(position)] = Some(builder.build(position)?);
        }
        Ok(MessageSchema {
            name: self.name,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_properties() {
        assert_eq!(ValueType::LllVar.prefix_digits(), Some(3));
        assert!(ValueType::LlBin.is_binary());
        assert!(!ValueType::LlVar.is_binary());
        assert_eq!(ValueType::LlVar.max_length(), 99);
        assert_eq!(ValueType::LlllBin.max_length(), 999);
        assert!(!ValueType::Bitmap.can_wrap_sub_fields());
        assert_eq!("lllbin".parse::<ValueType>().unwrap(), ValueType::LllBin);
        assert!("LVAR".parse::<ValueType>().is_err());
    }

    #[test]
    fn test_message_schema_dense_lookup() {
        let schema = MessageSchema::builder()
            .field(11, FieldSchema::primitive(ValueType::Numeric, 6))
            .field(2, FieldSchema::primitive(ValueType::LlVar, 19))
            .build()
            .unwrap();

        assert!(schema.field(2).unwrap().is_some());
        assert!(schema.field(3).unwrap().is_none());
        assert!(schema.field(128).unwrap().is_none());
        assert!(matches!(
            schema.field(129),
            Err(PackError::PositionOutOfRange { position: 129, .. })
        ));
        assert_eq!(schema.highest_position(), Some(11));
        assert_eq!(
            schema.fields().map(|(p, _)| p).collect::<Vec<_>>(),
            vec![2, 11]
        );
    }

    #[test]
    fn test_message_schema_rejects_position() {
        let err = MessageSchema::builder()
            .field(129, FieldSchema::primitive(ValueType::Alpha, 1))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidPosition { position: 129, .. }
        ));
    }

    #[test]
    fn test_missing_types() {
        let err = FieldSchemaBuilder::new().length(4).build(3).unwrap_err();
        assert_eq!(err, ValidationError::MissingFieldType { position: 3 });

        let err = FieldSchemaBuilder::new()
            .field_type(FieldType::Primitive)
            .length(4)
            .build(3)
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingValueType { position: 3 });
    }

    #[test]
    fn test_sub_field_lookup() {
        let schema = FieldSchema::composite(ValueType::LllVar, 999)
            .sub_field(2, FieldSchema::primitive(ValueType::Alpha, 3))
            .sub_field(1, FieldSchema::primitive(ValueType::Numeric, 2))
            .build(48)
            .unwrap();
        assert!(schema.sub_field(1).unwrap().is_some());
        assert!(schema.sub_field(0).unwrap().is_none());
        assert!(schema.sub_field(999).unwrap().is_none());
        assert!(schema.sub_field(1000).is_err());
        assert_eq!(schema.highest_sub_field(), Some(2));
    }

    #[test]
    fn test_field_metadata() {
        let schema = FieldSchema::primitive(ValueType::Alpha, 8)
            .with_name("Card Acceptor Terminal Identification")
            .with_description("Terminal id")
            .with_default("TERM0001")
            .with_codec("ascii")
            .build(41)
            .unwrap();
        assert_eq!(schema.default_value(), Some("TERM0001"));
        assert_eq!(schema.codec(), Some("ascii"));
        assert_eq!(schema.name(), Some("Card Acceptor Terminal Identification"));
    }
}

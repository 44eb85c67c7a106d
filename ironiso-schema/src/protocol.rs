/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Protocol schema: the top-level description of an ISO 8583 dialect.
//!
//! A [`ProtocolSchema`] holds wire conventions (character encoding, codec,
//! length prefix, header, trailer, bitmap layout), the message schemas keyed
//! by type pattern, and the correlation key fields per message type.

use crate::pattern::{TypePattern, resolve};
use crate::schema::{MessageSchema, MessageSchemaBuilder};
use crate::validate::validate_message;
use ironiso_core::{Charset, MessageType, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default number of length-prefix digits.
pub const DEFAULT_LENGTH_DIGITS: u8 = 4;

/// Default correlation key: trace number and terminal id.
pub const DEFAULT_KEY_FIELDS: [u16; 2] = [11, 41];

/// General message codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageCodec {
    /// Character-oriented: decimal length prefix, hex bitmap.
    Ascii,
    /// Byte-oriented: big-endian length prefix, raw bitmap, BCD numerics.
    Binary,
}

impl MessageCodec {
    /// Returns the identifier of the field codec this message codec uses by
    /// default.
    #[must_use]
    pub const fn field_codec(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Binary => "binary",
        }
    }

    /// Returns the allowed length-prefix width range.
    #[must_use]
    pub const fn length_digits_range(self) -> (u8, u8) {
        match self {
            Self::Ascii => (1, 9),
            Self::Binary => (1, 4),
        }
    }
}

/// How the header bytes are represented in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderKind {
    /// Characters in the protocol charset.
    Text,
    /// Raw bytes.
    Binary,
}

/// How the bitmap width is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BitmapLayout {
    /// Just wide enough for the highest data position the applicable
    /// message schema declares.
    #[default]
    Declared,
    /// 8-byte primary bitmap, plus an 8-byte secondary flagged by the first bit.
    Iso,
}

/// Which bit marks which field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BitmapNumbering {
    /// Bit `i - 1` marks field `i`; bit 0 is unused or flags a secondary bitmap.
    #[default]
    FieldMinusOne,
    /// Bit `i - 2` marks field `i`; field 2 owns the first bit.
    FieldMinusTwo,
}

impl BitmapNumbering {
    /// Returns the bit marking `position`.
    #[inline]
    #[must_use]
    pub const fn bit_for(self, position: u16) -> usize {
        match self {
            Self::FieldMinusOne => position as usize - 1,
            Self::FieldMinusTwo => position as usize - 2,
        }
    }

    /// Returns the field position a bit marks.
    #[inline]
    #[must_use]
    pub const fn position_for(self, bit: usize) -> usize {
        match self {
            Self::FieldMinusOne => bit + 1,
            Self::FieldMinusTwo => bit + 2,
        }
    }
}

impl fmt::Display for BitmapLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for BitmapNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Complete description of an ISO 8583 dialect.
///
/// Share it behind an `Arc`; it is never mutated after build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSchema {
    #[serde(default)]
    charset: Charset,
    codec: Option<MessageCodec>,
    length_digits: u8,
    #[serde(default)]
    header_length: usize,
    #[serde(default)]
    header_kind: Option<HeaderKind>,
    #[serde(default)]
    trailer: bool,
    #[serde(default)]
    bitmap_layout: BitmapLayout,
    #[serde(default)]
    bitmap_numbering: BitmapNumbering,
    messages: BTreeMap<TypePattern, MessageSchema>,
    #[serde(default)]
    key_fields: BTreeMap<TypePattern, Vec<u16>>,
    default_key_fields: Vec<u16>,
}

impl ProtocolSchema {
    /// Starts a protocol schema.
    #[must_use]
    pub fn builder() -> ProtocolSchemaBuilder {
        ProtocolSchemaBuilder::default()
    }

    /// Returns the character encoding.
    #[inline]
    #[must_use]
    pub const fn charset(&self) -> Charset {
        self.charset
    }

    /// Returns the message codec.
    ///
    /// A validated schema always has one; `Ascii` is returned otherwise.
    #[inline]
    #[must_use]
    pub fn codec(&self) -> MessageCodec {
        self.codec.unwrap_or(MessageCodec::Ascii)
    }

    /// Returns the length-prefix width in digits (ASCII) or bytes (binary).
    #[inline]
    #[must_use]
    pub const fn length_digits(&self) -> u8 {
        self.length_digits
    }

    /// Returns the fixed header length in bytes; 0 means no header.
    #[inline]
    #[must_use]
    pub const fn header_length(&self) -> usize {
        self.header_length
    }

    /// Returns the header representation: the declared kind, or text for
    /// the ASCII codec and bytes for the binary codec.
    #[must_use]
    pub fn header_kind(&self) -> HeaderKind {
        self.header_kind.unwrap_or(match self.codec() {
            MessageCodec::Ascii => HeaderKind::Text,
            MessageCodec::Binary => HeaderKind::Binary,
        })
    }

    /// Returns true if frames carry a trailer byte.
    #[inline]
    #[must_use]
    pub const fn has_trailer(&self) -> bool {
        self.trailer
    }

    /// Returns the bitmap layout.
    #[inline]
    #[must_use]
    pub const fn bitmap_layout(&self) -> BitmapLayout {
        self.bitmap_layout
    }

    /// Returns the bitmap numbering.
    #[inline]
    #[must_use]
    pub const fn bitmap_numbering(&self) -> BitmapNumbering {
        self.bitmap_numbering
    }

    /// Returns the message schema for a 4-character type.
    ///
    /// An exact entry is preferred, then the most specific matching pattern.
    #[must_use]
    pub fn message_schema(&self, mti: &str) -> Option<&MessageSchema> {
        resolve(&self.messages, mti)
    }

    /// Returns the message schema for a message type.
    #[must_use]
    pub fn message_schema_for(&self, mti: &MessageType) -> Option<&MessageSchema> {
        self.message_schema(&mti.encode())
    }

    /// Iterates message schemas with their patterns.
    pub fn message_schemas(&self) -> impl Iterator<Item = (&TypePattern, &MessageSchema)> {
        self.messages.iter()
    }

    /// Returns the correlation key fields for a message type.
    ///
    /// Responses resolve through the request they answer, so `0810` uses the
    /// `0800` entry.
    #[must_use]
    pub fn key_fields_for(&self, mti: &MessageType) -> &[u16] {
        resolve(&self.key_fields, &mti.request_form().encode())
            .unwrap_or(&self.default_key_fields)
    }

    /// Checks every schema invariant.
    ///
    /// # Errors
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let codec = self.codec.ok_or(ValidationError::MissingCodec)?;
        if self.messages.is_empty() {
            return Err(ValidationError::MissingMessageSchema);
        }
        let (min, max) = codec.length_digits_range();
        if !(min..=max).contains(&self.length_digits) {
            return Err(ValidationError::InvalidLengthDigits {
                digits: self.length_digits,
                min,
                max,
            });
        }
        if self.bitmap_layout == BitmapLayout::Iso
            && self.bitmap_numbering != BitmapNumbering::FieldMinusOne
        {
            return Err(ValidationError::IncompatibleBitmap {
                layout: self.bitmap_layout.to_string(),
                numbering: self.bitmap_numbering.to_string(),
            });
        }
        for schema in self.messages.values() {
            validate_message(schema)?;
        }
        Ok(())
    }
}

/// Builder for [`ProtocolSchema`].
#[derive(Debug, Clone)]
pub struct ProtocolSchemaBuilder {
    charset: Charset,
    codec: Option<MessageCodec>,
    length_digits: u8,
    header_length: usize,
    header_kind: Option<HeaderKind>,
    trailer: bool,
    bitmap_layout: BitmapLayout,
    bitmap_numbering: BitmapNumbering,
    messages: Vec<(String, MessageSchemaBuilder)>,
    key_fields: Vec<(String, Vec<u16>)>,
    default_key_fields: Vec<u16>,
}

impl Default for ProtocolSchemaBuilder {
    fn default() -> Self {
        Self {
            charset: Charset::default(),
            codec: None,
            length_digits: DEFAULT_LENGTH_DIGITS,
            header_length: 0,
            header_kind: None,
            trailer: false,
            bitmap_layout: BitmapLayout::default(),
            bitmap_numbering: BitmapNumbering::default(),
            messages: Vec::new(),
            key_fields: Vec::new(),
            default_key_fields: DEFAULT_KEY_FIELDS.to_vec(),
        }
    }
}

impl ProtocolSchemaBuilder {
    /// Sets the character encoding.
    #[must_use]
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Sets the message codec.
    #[must_use]
    pub fn codec(mut self, codec: MessageCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Sets the length-prefix width.
    #[must_use]
    pub fn length_digits(mut self, digits: u8) -> Self {
        self.length_digits = digits;
        self
    }

    /// Sets the fixed header length in bytes.
    #[must_use]
    pub fn header_length(mut self, length: usize) -> Self {
        self.header_length = length;
        self
    }

    /// Declares the header representation, overriding the codec default.
    #[must_use]
    pub fn header_kind(mut self, kind: HeaderKind) -> Self {
        self.header_kind = Some(kind);
        self
    }

    /// Declares whether frames carry a trailer byte.
    #[must_use]
    pub fn trailer(mut self, trailer: bool) -> Self {
        self.trailer = trailer;
        self
    }

    /// Sets the bitmap layout.
    #[must_use]
    pub fn bitmap_layout(mut self, layout: BitmapLayout) -> Self {
        self.bitmap_layout = layout;
        self
    }

    /// Sets the bitmap numbering.
    #[must_use]
    pub fn bitmap_numbering(mut self, numbering: BitmapNumbering) -> Self {
        self.bitmap_numbering = numbering;
        self
    }

    /// Adds a message schema for a type pattern.
    #[must_use]
    pub fn message(mut self, pattern: impl Into<String>, schema: MessageSchemaBuilder) -> Self {
        self.messages.push((pattern.into(), schema));
        self
    }

    /// Declares the correlation key fields for a type pattern.
    #[must_use]
    pub fn key_fields(mut self, pattern: impl Into<String>, positions: &[u16]) -> Self {
        self.key_fields.push((pattern.into(), positions.to_vec()));
        self
    }

    /// Sets the key fields used when no pattern matches.
    #[must_use]
    pub fn default_key_fields(mut self, positions: &[u16]) -> Self {
        self.default_key_fields = positions.to_vec();
        self
    }

    /// Builds and validates the protocol schema.
    ///
    /// # Errors
    /// Returns a `ValidationError` for a missing codec, no message schemas,
    /// a malformed pattern, or any invalid field schema.
    pub fn build(self) -> Result<ProtocolSchema, ValidationError> {
        let mut messages = BTreeMap::new();
        for (pattern, builder) in self.messages {
            messages.insert(TypePattern::parse(&pattern)?, builder.build()?);
        }
        let mut key_fields = BTreeMap::new();
        for (pattern, positions) in self.key_fields {
            key_fields.insert(TypePattern::parse(&pattern)?, positions);
        }
        let schema = ProtocolSchema {
            charset: self.charset,
            codec: self.codec,
            length_digits: self.length_digits,
            header_length: self.header_length,
            header_kind: self.header_kind,
            trailer: self.trailer,
            bitmap_layout: self.bitmap_layout,
            bitmap_numbering: self.bitmap_numbering,
            messages,
            key_fields,
            default_key_fields: self.default_key_fields,
        };
        schema.validate()?;
        Ok(schema)
    }
}

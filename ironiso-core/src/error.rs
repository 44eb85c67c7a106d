/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the IronIso ISO 8583 engine.
//!
//! Errors are grouped by the stage that raises them:
//! - [`ValidationError`]: schema or configuration is malformed, raised at build time
//! - [`PackError`]: a single message could not be packed or unpacked
//! - [`CorrelationError`]: a pending request did not complete
//! - [`StateError`]: an operation is illegal for the message's current state

use thiserror::Error;

/// Result type alias using [`IsoError`] as the error type.
pub type Result<T> = std::result::Result<T, IsoError>;

/// Top-level error type for all IronIso operations.
#[derive(Debug, Error)]
pub enum IsoError {
    /// Schema or configuration validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Message packing or unpacking failed.
    #[error("packaging error: {0}")]
    Pack(#[from] PackError),

    /// Request/response correlation failed.
    #[error("correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    /// Operation is illegal for the current message state.
    #[error("illegal state: {0}")]
    IllegalState(#[from] StateError),

    /// I/O error from underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IsoError {
    /// Returns true if this error is a correlation timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Correlation(CorrelationError::Timeout { .. }))
    }
}

/// Errors raised while building or validating schemas and configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The protocol schema does not name a message codec.
    #[error("protocol schema has no message codec")]
    MissingCodec,

    /// The protocol schema has no message schema entries.
    #[error("protocol schema has no message schemas")]
    MissingMessageSchema,

    /// A field schema was built without a field type.
    #[error("field {position}: missing field type")]
    MissingFieldType {
        /// Position of the offending field.
        position: u16,
    },

    /// A field schema was built without a value type.
    #[error("field {position}: missing value type")]
    MissingValueType {
        /// Position of the offending field.
        position: u16,
    },

    /// A field length is outside the allowed range.
    #[error("field {position}: length {length} outside [{min}, {max}]")]
    InvalidLength {
        /// Position of the offending field.
        position: u16,
        /// Declared length.
        length: u16,
        /// Minimum allowed length.
        min: u16,
        /// Maximum allowed length.
        max: u16,
    },

    /// A field or sub-field position is outside the allowed range.
    #[error("position {position} outside [{min}, {max}]")]
    InvalidPosition {
        /// Offending position.
        position: u16,
        /// Minimum allowed position.
        min: u16,
        /// Maximum allowed position.
        max: u16,
    },

    /// A primitive field schema declares sub-fields.
    #[error("field {position}: primitive field cannot declare sub-fields")]
    PrimitiveWithSubFields {
        /// Position of the offending field.
        position: u16,
    },

    /// A composite or constructed field schema has no sub-fields.
    #[error("field {position}: compound field declares no sub-fields")]
    CompoundWithoutSubFields {
        /// Position of the offending field.
        position: u16,
    },

    /// A compound field uses a value type that cannot wrap sub-fields.
    #[error("field {position}: value type {value_type} cannot wrap sub-fields")]
    InvalidCompoundValueType {
        /// Position of the offending field.
        position: u16,
        /// Name of the rejected value type.
        value_type: String,
    },

    /// A message type pattern is malformed.
    #[error("invalid message type pattern '{0}': expected 4 digits or '*'")]
    InvalidTypePattern(String),

    /// The length prefix width is unsupported for the codec.
    #[error("length prefix of {digits} digits unsupported, allowed [{min}, {max}]")]
    InvalidLengthDigits {
        /// Configured digit or byte count.
        digits: u8,
        /// Minimum allowed.
        min: u8,
        /// Maximum allowed.
        max: u8,
    },

    /// Bitmap layout and numbering cannot be combined.
    #[error("bitmap layout {layout} does not support numbering {numbering}")]
    IncompatibleBitmap {
        /// Configured layout.
        layout: String,
        /// Configured numbering.
        numbering: String,
    },

    /// A field names a codec that is not registered.
    #[error("field {position}: unknown field codec '{codec}'")]
    UnknownCodec {
        /// Position of the offending field.
        position: u16,
        /// Codec identifier.
        codec: String,
    },

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while packing or unpacking a single message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    /// The message type string is empty or not 4 characters.
    #[error("invalid message type length: expected 4, found {length}")]
    InvalidMessageTypeLength {
        /// Actual length of the input.
        length: usize,
    },

    /// A message type digit has no enum mapping.
    #[error("invalid message type digit '{character}' at position {position}")]
    InvalidMessageTypeDigit {
        /// Offending character.
        character: char,
        /// Zero-based position within the 4-character string.
        position: usize,
    },

    /// The value type is not supported by the resolved field packager.
    #[error("field {position}: value type {value_type} unsupported by packager '{packager}'")]
    UnsupportedValueType {
        /// Position of the field.
        position: u16,
        /// Name of the value type.
        value_type: String,
        /// Identifier of the packager.
        packager: String,
    },

    /// No message schema applies to the message type.
    #[error("no message schema for type {0}")]
    NoMessageSchema(String),

    /// A bitmap bit is set for a position without a field schema.
    #[error("no field schema for position {position}")]
    NoFieldSchema {
        /// Position indicated by the bitmap.
        position: u16,
    },

    /// A position is outside the addressable range.
    #[error("position {position} out of range [{min}, {max}]")]
    PositionOutOfRange {
        /// Offending position.
        position: u16,
        /// Minimum allowed position.
        min: u16,
        /// Maximum allowed position.
        max: u16,
    },

    /// Input ended before a field was fully read.
    #[error("truncated input at field {position}: need {needed} bytes, have {available}")]
    Truncated {
        /// Position of the field being read.
        position: u16,
        /// Bytes needed.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// Bytes remained after the last field or after the frame.
    #[error("{count} unexpected trailing bytes")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        count: usize,
    },

    /// A value does not fit the declared field length.
    #[error("field {position}: length {length} exceeds max {max_length}")]
    FieldTooLong {
        /// Position of the field.
        position: u16,
        /// Actual length of the value.
        length: usize,
        /// Maximum allowed length.
        max_length: usize,
    },

    /// A fixed-length value does not match the declared length.
    #[error("field {position}: expected exactly {expected} bytes, found {actual}")]
    LengthMismatch {
        /// Position of the field.
        position: u16,
        /// Declared length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A field value is malformed for its value type.
    #[error("field {position}: invalid value: {reason}")]
    InvalidFieldValue {
        /// Position of the field.
        position: u16,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// A required sub-field is absent and has no default.
    #[error("field {position}: missing sub-field {sub_position}")]
    MissingSubField {
        /// Position of the compound field.
        position: u16,
        /// Position of the missing sub-field.
        sub_position: u16,
    },

    /// The frame length prefix is malformed.
    #[error("invalid length prefix: {0}")]
    InvalidLengthPrefix(String),

    /// A length does not fit the configured prefix.
    #[error("length {length} exceeds maximum {max} for the length prefix")]
    LengthOverflow {
        /// Length to encode.
        length: usize,
        /// Maximum representable length.
        max: usize,
    },

    /// A character cannot be represented in the protocol encoding.
    #[error("field {position}: character '{character}' not representable in {charset}")]
    Unencodable {
        /// Position of the field.
        position: u16,
        /// Offending character.
        character: char,
        /// Name of the character encoding.
        charset: String,
    },
}

/// Errors raised while correlating a request with its response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    /// No matching response arrived before the deadline.
    #[error("no response within {elapsed_ms} milliseconds")]
    Timeout {
        /// Configured expiry in milliseconds.
        elapsed_ms: u64,
    },

    /// The completion slot was dropped without a result.
    #[error("pending request closed without a result")]
    Closed,

    /// The transport rejected the outbound frame.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors raised when an operation is illegal for the message state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The message function has no response counterpart.
    #[error("function {function} has no response counterpart")]
    NoResponseCounterpart {
        /// Name of the current function.
        function: String,
    },
}

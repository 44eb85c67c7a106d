/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronIso Schema
//!
//! Declarative ISO 8583 schemas for the IronIso engine.
//!
//! This crate provides:
//! - **Field and message schemas**: value type, length, sub-fields per position
//! - **Protocol schemas**: wire conventions and type-pattern lookup
//! - **Validation**: structural checks run at build time
//! - **Known dialects**: ISO 8583:1987 element tables for character and binary codecs

pub mod known;
pub mod pattern;
pub mod protocol;
pub mod schema;
pub mod validate;

pub use known::KnownSchema;
pub use pattern::{TypePattern, resolve};
pub use protocol::{
    BitmapLayout, BitmapNumbering, DEFAULT_KEY_FIELDS, DEFAULT_LENGTH_DIGITS, HeaderKind,
    MessageCodec, ProtocolSchema, ProtocolSchemaBuilder,
};
pub use schema::{
    FieldSchema, FieldSchemaBuilder, FieldType, MAX_FIELD_LENGTH, MIN_FIELD_LENGTH,
    MessageSchema, MessageSchemaBuilder, ValueType,
};
pub use validate::{validate_field, validate_message};

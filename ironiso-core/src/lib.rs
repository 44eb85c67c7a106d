/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronIso Core
//!
//! Core types and error definitions for the IronIso ISO 8583 engine.
//!
//! This crate provides the fundamental building blocks used across all IronIso crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Message type**: `MessageType` and its four digit enumerations
//! - **Field types**: `Field`, `FieldValue`, `SubFields` and `Bitmap`
//! - **Messages**: `IsoMessage` with header, data fields and trailer
//! - **Core types**: `Charset`, `Direction`, `Stan`
//!
//! ## Ownership
//!
//! Messages are plain owned values. They move into a send call and come back
//! out of a receive, so no locking is needed around them.

pub mod bitmap;
pub mod error;
pub mod field;
pub mod message;
pub mod mti;
pub mod types;

pub use bitmap::Bitmap;
pub use error::{CorrelationError, IsoError, PackError, Result, StateError, ValidationError};
pub use field::{Field, FieldValue, MAX_SUBFIELD_POSITION, SubFields};
pub use message::{FIRST_DATA_FIELD, Header, IsoMessage, MAX_FIELD_POSITION};
pub use mti::{
    MTI_LENGTH, MessageClass, MessageFunction, MessageOrigin, MessageType, MessageVersion,
};
pub use types::{Charset, Direction, STAN_MAX, Stan};

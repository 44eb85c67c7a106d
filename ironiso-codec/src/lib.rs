/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronIso Codec
//!
//! ISO 8583 packing and unpacking for the IronIso engine.
//!
//! A [`MessagePackager`] turns an [`IsoMessage`](ironiso_core::IsoMessage)
//! into a length-prefixed frame and back, driven by a
//! [`ProtocolSchema`](ironiso_schema::ProtocolSchema). Individual fields are
//! written by [`FieldPackager`] implementations looked up in a
//! [`FieldPackagerRegistry`].
//!
//! ## Features
//!
//! - **Two wire encodings**: character ([`AsciiFieldPackager`]) and BCD/raw
//!   ([`BinaryFieldPackager`])
//! - **Compound fields**: composite and constructed fields, nested to any depth
//! - **Per-field codecs**: any field or sub-field may name its own packager

pub mod ascii;
pub mod binary;
pub mod length;
pub mod message;
pub mod packager;
pub mod reader;
pub mod registry;

pub use ascii::{ASCII_PACKAGER_ID, AsciiFieldPackager};
pub use binary::{BINARY_PACKAGER_ID, BinaryFieldPackager};
pub use length::LengthPrefix;
pub use message::MessagePackager;
pub use packager::{FieldContext, FieldPackager, pack_field, unpack_field};
pub use reader::FieldReader;
pub use registry::FieldPackagerRegistry;

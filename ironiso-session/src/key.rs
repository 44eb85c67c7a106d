/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Correlation keys.
//!
//! A key is derived from the field positions a protocol schema names for a
//! message type. Requests and their responses resolve the same positions, so
//! a response reproduces the key of the request it answers.
//!
//! Each component carries its position and value kind, so `11=000001` and
//! `41=000001` never collide, and neither does a text value with the hex
//! rendering of a binary one (`11#AB01`).

use ironiso_core::IsoMessage;
use ironiso_schema::ProtocolSchema;
use std::fmt::{Debug, Write};
use std::sync::Arc;

/// Separator placed between key components.
pub const KEY_SEPARATOR: char = '|';

/// Marks a text component.
const TEXT_MARKER: char = '=';

/// Marks a binary component rendered as hex.
const BINARY_MARKER: char = '#';

/// Derives a correlation key from a message.
pub trait MessageKeyGenerator: Send + Sync + Debug {
    /// Returns the key for `message`. Equal field contents give equal keys.
    fn generate(&self, message: &IsoMessage) -> String;
}

/// Key generator driven by the key-field table of a protocol schema.
#[derive(Debug, Clone)]
pub struct SchemaKeyGenerator {
    schema: Arc<ProtocolSchema>,
}

impl SchemaKeyGenerator {
    /// Creates a key generator over `schema`.
    #[must_use]
    pub fn new(schema: Arc<ProtocolSchema>) -> Self {
        Self { schema }
    }

    /// Returns the protocol schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<ProtocolSchema> {
        &self.schema
    }
}

impl MessageKeyGenerator for SchemaKeyGenerator {
    fn generate(&self, message: &IsoMessage) -> String {
        let mut key = String::new();
        let present = self
            .schema
            .key_fields_for(message.mti())
            .iter()
            .filter_map(|&position| {
                message
                    .field(position)
                    .ok()
                    .flatten()
                    .map(|field| (position, field))
            });
        for (i, (position, field)) in present.enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            let marker = if field.as_binary().is_some() {
                BINARY_MARKER
            } else {
                TEXT_MARKER
            };
            // Writing to a String cannot fail.
            let _ = write!(key, "{position}{marker}{field}");
        }
        key
    }
}

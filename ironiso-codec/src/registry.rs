/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field packager registry.
//!
//! Filled once at setup, then shared read-only behind an `Arc`.

use crate::ascii::AsciiFieldPackager;
use crate::binary::BinaryFieldPackager;
use crate::packager::FieldPackager;
use ironiso_core::ValidationError;
use ironiso_schema::{FieldSchema, ProtocolSchema};
use std::collections::HashMap;
use std::sync::Arc;

/// Field packagers by identifier.
#[derive(Debug, Clone, Default)]
pub struct FieldPackagerRegistry {
    packagers: HashMap<String, Arc<dyn FieldPackager>>,
}

impl FieldPackagerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the `ascii` and `binary` packagers.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with(Arc::new(AsciiFieldPackager))
            .with(Arc::new(BinaryFieldPackager))
    }

    /// Adds a packager under its own identifier, replacing any previous one.
    #[must_use]
    pub fn with(mut self, packager: Arc<dyn FieldPackager>) -> Self {
        self.register(packager);
        self
    }

    /// Adds a packager under its own identifier, replacing any previous one.
    pub fn register(&mut self, packager: Arc<dyn FieldPackager>) {
        self.packagers.insert(packager.id().to_string(), packager);
    }

    /// Returns the packager registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn FieldPackager> {
        self.packagers.get(id).map(Arc::as_ref)
    }

    /// Returns true if a packager is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.packagers.contains_key(id)
    }

    /// Returns the number of registered packagers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packagers.len()
    }

    /// Returns true if no packager is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packagers.is_empty()
    }

    /// Checks that every packager a protocol schema names is registered.
    ///
    /// # Errors
    /// Returns `ValidationError::UnknownCodec` for the first missing one.
    pub fn check_schema(&self, schema: &ProtocolSchema) -> Result<(), ValidationError> {
        let default = schema.codec().field_codec();
        if !self.contains(default) {
            return Err(ValidationError::UnknownCodec {
                position: 0,
                codec: default.to_string(),
            });
        }
        for (_, message) in schema.message_schemas() {
            for (position, field) in message.fields() {
                self.check_field(position, field)?;
            }
        }
        Ok(())
    }

    fn check_field(&self, position: u16, field: &FieldSchema) -> Result<(), ValidationError> {
        if let Some(codec) = field.codec()
            && !self.contains(codec)
        {
            return Err(ValidationError::UnknownCodec {
                position,
                codec: codec.to_string(),
            });
        }
        for (sub_position, sub) in field.sub_fields() {
            self.check_field(sub_position, sub)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironiso_schema::{MessageCodec, MessageSchema, ValueType};

    #[test]
    fn test_defaults() {
        let registry = FieldPackagerRegistry::with_defaults();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("ascii").map(|p| p.id()), Some("ascii"));
        assert_eq!(registry.get("binary").map(|p| p.id()), Some("binary"));
        assert!(registry.get("ebcdic").is_none());
        assert!(FieldPackagerRegistry::new().is_empty());
    }

    #[test]
    fn test_check_schema_unknown_codec() {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .message(
                "****",
                MessageSchema::builder().field(
                    48,
                    FieldSchema::composite(ValueType::LllVar, 999).sub_field(
                        2,
                        FieldSchema::primitive(ValueType::Numeric, 4).with_codec("ebcdic"),
                    ),
                ),
            )
            .build()
            .unwrap();
        assert_eq!(
            FieldPackagerRegistry::with_defaults().check_schema(&schema),
            Err(ValidationError::UnknownCodec {
                position: 2,
                codec: "ebcdic".to_string()
            })
        );
    }

    #[test]
    fn test_check_schema_default_codec() {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Binary)
            .message("****", MessageSchema::builder())
            .build()
            .unwrap();
        let registry = FieldPackagerRegistry::new().with(Arc::new(AsciiFieldPackager));
        assert!(matches!(
            registry.check_schema(&schema),
            Err(ValidationError::UnknownCodec { position: 0, .. })
        ));
        assert!(
            FieldPackagerRegistry::with_defaults()
                .check_schema(&schema)
                .is_ok()
        );
    }
}

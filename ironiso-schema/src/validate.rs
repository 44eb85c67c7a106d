/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema validation rules.
//!
//! Builders run these checks as they build. [`ProtocolSchema::validate`]
//! runs them again over the whole tree, which covers schemas that were
//! deserialized rather than built.
//!
//! [`ProtocolSchema::validate`]: crate::ProtocolSchema::validate

use crate::schema::{FieldSchema, FieldType, MAX_FIELD_LENGTH, MIN_FIELD_LENGTH, MessageSchema};
use ironiso_core::{MAX_FIELD_POSITION, MAX_SUBFIELD_POSITION, ValidationError};

/// Validates one field schema and its sub-fields.
///
/// # Errors
/// Returns the first rule the schema breaks.
pub fn validate_field(position: u16, schema: &FieldSchema) -> Result<(), ValidationError> {
    let length = schema.length();
    let value_type = schema.value_type();
    let max = value_type.max_length().min(MAX_FIELD_LENGTH);
    if !(MIN_FIELD_LENGTH..=max).contains(&length) {
        return Err(ValidationError::InvalidLength {
            position,
            length,
            min: MIN_FIELD_LENGTH,
            max,
        });
    }

    let has_sub_fields = schema.sub_fields().next().is_some();
    if !schema.field_type().is_compound() {
        if has_sub_fields {
            return Err(ValidationError::PrimitiveWithSubFields { position });
        }
        return Ok(());
    }

    if !has_sub_fields {
        return Err(ValidationError::CompoundWithoutSubFields { position });
    }
    if !value_type.can_wrap_sub_fields() {
        return Err(ValidationError::InvalidCompoundValueType {
            position,
            value_type: value_type.to_string(),
        });
    }
    // Constructed sub-fields are numbered from the first bit of their bitmap.
    let min = u16::from(schema.field_type() == FieldType::Constructed);
    for (sub_position, sub) in schema.sub_fields() {
        if !(min..=MAX_SUBFIELD_POSITION).contains(&sub_position) {
            return Err(ValidationError::InvalidPosition {
                position: sub_position,
                min,
                max: MAX_SUBFIELD_POSITION,
            });
        }
        validate_field(sub_position, sub)?;
    }
    Ok(())
}

/// Validates every field schema of a message schema.
///
/// # Errors
/// Returns the first rule a field schema breaks.
pub fn validate_message(schema: &MessageSchema) -> Result<(), ValidationError> {
    for (position, field) in schema.fields() {
        if position > MAX_FIELD_POSITION {
            return Err(ValidationError::InvalidPosition {
                position,
                min: 0,
                max: MAX_FIELD_POSITION,
            });
        }
        validate_field(position, field)?;
    }
    Ok(())
}

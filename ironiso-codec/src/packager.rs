/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field packaging.
//!
//! A [`FieldPackager`] knows how one wire encoding writes the value types
//! that differ between encodings: message types, bitmaps, numerics and
//! length prefixes. Everything shared lives in [`pack_field`] and
//! [`unpack_field`]: value-type dispatch, padding and length checks, and
//! the recursion into composite and constructed fields.
//!
//! Sub-fields may name their own packager through the schema `codec`
//! attribute; it is looked up in the [`FieldPackagerRegistry`] carried by
//! the [`FieldContext`]. Without one, a sub-field inherits its parent's.

use crate::reader::FieldReader;
use crate::registry::FieldPackagerRegistry;
use bytes::{BufMut, Bytes, BytesMut};
use ironiso_core::{Bitmap, Charset, Field, FieldValue, MessageType, PackError, SubFields};
use ironiso_schema::{FieldSchema, FieldType, ValueType};
use std::fmt;

/// State shared by every field of one pack or unpack call.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    charset: Charset,
    position: u16,
    registry: &'a FieldPackagerRegistry,
}

impl<'a> FieldContext<'a> {
    /// Creates a context positioned at field 0.
    #[must_use]
    pub const fn new(charset: Charset, registry: &'a FieldPackagerRegistry) -> Self {
        Self {
            charset,
            position: 0,
            registry,
        }
    }

    /// Returns a copy positioned at another field or sub-field.
    #[inline]
    #[must_use]
    pub const fn at(self, position: u16) -> Self {
        Self { position, ..self }
    }

    /// Returns the character encoding.
    #[inline]
    #[must_use]
    pub const fn charset(&self) -> Charset {
        self.charset
    }

    /// Returns the position of the field being processed.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> u16 {
        self.position
    }

    /// Returns the packager registry.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &'a FieldPackagerRegistry {
        self.registry
    }

    /// Resolves the packager for `schema`: its named codec if any, else
    /// `inherited`.
    ///
    /// # Errors
    /// Returns `PackError::InvalidFieldValue` for an unregistered codec.
    pub fn packager_for<'p>(
        &self,
        schema: &FieldSchema,
        inherited: &'p dyn FieldPackager,
    ) -> Result<&'p dyn FieldPackager, PackError>
    where
        'a: 'p,
    {
        match schema.codec() {
            None => Ok(inherited),
            Some(id) => self
                .registry
                .get(id)
                .ok_or_else(|| PackError::InvalidFieldValue {
                    position: self.position,
                    reason: format!("field codec '{id}' is not registered"),
                }),
        }
    }
}

/// Builds the error a packager returns for a value type it cannot write.
#[must_use]
pub fn unsupported(packager: &str, position: u16, value_type: ValueType) -> PackError {
    PackError::UnsupportedValueType {
        position,
        value_type: value_type.to_string(),
        packager: packager.to_string(),
    }
}

/// Encoding-specific half of field packaging.
///
/// Each hook defaults to `PackError::UnsupportedValueType`, so a packager
/// for a narrow dialect implements only what it supports. Text payloads
/// default to the protocol charset.
pub trait FieldPackager: Send + Sync + fmt::Debug {
    /// Returns the registry identifier.
    fn id(&self) -> &str;

    /// Writes a message type indicator.
    fn encode_message_type(
        &self,
        ctx: &FieldContext<'_>,
        _mti: &MessageType,
        _out: &mut BytesMut,
    ) -> Result<(), PackError> {
        Err(unsupported(self.id(), ctx.position(), ValueType::MessageType))
    }

    /// Reads a message type indicator.
    fn decode_message_type(
        &self,
        ctx: &FieldContext<'_>,
        _reader: &mut FieldReader<'_>,
    ) -> Result<MessageType, PackError> {
        Err(unsupported(self.id(), ctx.position(), ValueType::MessageType))
    }

    /// Writes a bitmap of exactly its own width.
    fn encode_bitmap(
        &self,
        ctx: &FieldContext<'_>,
        _bitmap: &Bitmap,
        _out: &mut BytesMut,
    ) -> Result<(), PackError> {
        Err(unsupported(self.id(), ctx.position(), ValueType::Bitmap))
    }

    /// Reads a bitmap of `len_bytes` bytes.
    fn decode_bitmap(
        &self,
        ctx: &FieldContext<'_>,
        _len_bytes: usize,
        _reader: &mut FieldReader<'_>,
    ) -> Result<Bitmap, PackError> {
        Err(unsupported(self.id(), ctx.position(), ValueType::Bitmap))
    }

    /// Writes decimal digits left-padded with zeros to `length` digits.
    ///
    /// `digits` is already checked to be at most `length` decimal digits.
    fn encode_numeric(
        &self,
        ctx: &FieldContext<'_>,
        _digits: &str,
        _length: u16,
        _out: &mut BytesMut,
    ) -> Result<(), PackError> {
        Err(unsupported(self.id(), ctx.position(), ValueType::Numeric))
    }

    /// Reads `length` decimal digits.
    fn decode_numeric(
        &self,
        ctx: &FieldContext<'_>,
        _length: u16,
        _reader: &mut FieldReader<'_>,
    ) -> Result<String, PackError> {
        Err(unsupported(self.id(), ctx.position(), ValueType::Numeric))
    }

    /// Writes a variable-length prefix of `digits` digits.
    fn encode_length(
        &self,
        ctx: &FieldContext<'_>,
        _length: usize,
        digits: u8,
        _out: &mut BytesMut,
    ) -> Result<(), PackError> {
        Err(unsupported(self.id(), ctx.position(), prefixed_type(digits)))
    }

    /// Reads a variable-length prefix of `digits` digits.
    fn decode_length(
        &self,
        ctx: &FieldContext<'_>,
        digits: u8,
        _reader: &mut FieldReader<'_>,
    ) -> Result<usize, PackError> {
        Err(unsupported(self.id(), ctx.position(), prefixed_type(digits)))
    }

    /// Writes character data in the protocol charset.
    fn encode_text(
        &self,
        ctx: &FieldContext<'_>,
        text: &str,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        let charset = ctx.charset();
        charset
            .encode_into(text, out)
            .map_err(|character| PackError::Unencodable {
                position: ctx.position(),
                character,
                charset: charset.name().to_string(),
            })
    }

    /// Reads character data in the protocol charset.
    fn decode_text(&self, ctx: &FieldContext<'_>, bytes: &[u8]) -> Result<String, PackError> {
        let charset = ctx.charset();
        charset
            .decode(bytes)
            .map_err(|byte| PackError::InvalidFieldValue {
                position: ctx.position(),
                reason: format!("byte 0x{byte:02X} is not valid {charset}"),
            })
    }
}

fn prefixed_type(digits: u8) -> ValueType {
    match digits {
        2 => ValueType::LlVar,
        3 => ValueType::LllVar,
        _ => ValueType::LlllVar,
    }
}

/// Returns the field a schema default stands for.
///
/// Binary defaults are written as hex.
///
/// # Errors
/// Returns `PackError::InvalidFieldValue` for a binary default that is not hex.
pub fn default_field(position: u16, schema: &FieldSchema) -> Result<Option<Field>, PackError> {
    let Some(value) = schema.default_value() else {
        return Ok(None);
    };
    if !schema.value_type().is_binary() {
        return Ok(Some(Field::text(value)));
    }
    let bytes = hex::decode(value).map_err(|e| PackError::InvalidFieldValue {
        position,
        reason: format!("default value is not hex: {e}"),
    })?;
    Ok(Some(Field::binary(bytes)))
}

/// Packs one field with `packager`.
///
/// # Errors
/// Returns a `PackError` if the value does not fit its schema or a
/// packager lacks a needed hook.
pub fn pack_field(
    packager: &dyn FieldPackager,
    ctx: &FieldContext<'_>,
    schema: &FieldSchema,
    field: &Field,
    out: &mut BytesMut,
) -> Result<(), PackError> {
    match (schema.field_type().is_compound(), field) {
        (false, Field::Primitive(value)) => pack_value(packager, ctx, schema, value, out),
        (true, Field::Composite(subs)) => pack_compound(packager, ctx, schema, subs, out),
        (true, Field::Primitive(value)) => Err(PackError::InvalidFieldValue {
            position: ctx.position(),
            reason: format!("{} value given for a compound field", value.kind()),
        }),
        (false, Field::Composite(_)) => Err(PackError::InvalidFieldValue {
            position: ctx.position(),
            reason: "sub-fields given for a primitive field".to_string(),
        }),
    }
}

/// Unpacks one field with `packager`.
///
/// # Errors
/// Returns a `PackError` for truncated or malformed input.
pub fn unpack_field(
    packager: &dyn FieldPackager,
    ctx: &FieldContext<'_>,
    schema: &FieldSchema,
    reader: &mut FieldReader<'_>,
) -> Result<Field, PackError> {
    if schema.field_type().is_compound() {
        unpack_compound(packager, ctx, schema, reader)
    } else {
        unpack_value(packager, ctx, schema, reader).map(Field::Primitive)
    }
}

fn check_max(position: u16, length: usize, max_length: usize) -> Result<(), PackError> {
    if length > max_length {
        return Err(PackError::FieldTooLong {
            position,
            length,
            max_length,
        });
    }
    Ok(())
}

fn mismatch(position: u16, value_type: ValueType, value: &FieldValue) -> PackError {
    PackError::InvalidFieldValue {
        position,
        reason: format!("{} value does not fit a {value_type} field", value.kind()),
    }
}

fn pack_value(
    packager: &dyn FieldPackager,
    ctx: &FieldContext<'_>,
    schema: &FieldSchema,
    value: &FieldValue,
    out: &mut BytesMut,
) -> Result<(), PackError> {
    let position = ctx.position();
    let value_type = schema.value_type();
    let length = usize::from(schema.length());
    let wrong = || mismatch(position, value_type, value);

    match value_type {
        ValueType::MessageType => {
            let mti = value.as_message_type().ok_or_else(wrong)?;
            packager.encode_message_type(ctx, mti, out)
        }
        ValueType::Bitmap => {
            let bitmap = value.as_bitmap().ok_or_else(wrong)?;
            check_max(position, bitmap.len_bytes(), length)?;
            let mut padded = bitmap.clone();
            padded.extend(&Bitmap::new(length - bitmap.len_bytes()));
            packager.encode_bitmap(ctx, &padded, out)
        }
        ValueType::Alpha => {
            let text = value.as_text().ok_or_else(wrong)?;
            let count = text.chars().count();
            check_max(position, count, length)?;
            packager.encode_text(ctx, text, out)?;
            out.put_bytes(b' ', length - count);
            Ok(())
        }
        ValueType::Numeric => {
            let text = value.as_text().ok_or_else(wrong)?;
            if let Some(bad) = text.chars().find(|c| !c.is_ascii_digit()) {
                return Err(PackError::InvalidFieldValue {
                    position,
                    reason: format!("'{bad}' is not a decimal digit"),
                });
            }
            check_max(position, text.len(), length)?;
            packager.encode_numeric(ctx, text, schema.length(), out)
        }
        ValueType::Binary => {
            let bytes = value.as_binary().ok_or_else(wrong)?;
            if bytes.len() != length {
                return Err(PackError::LengthMismatch {
                    position,
                    expected: length,
                    actual: bytes.len(),
                });
            }
            out.put_slice(bytes);
            Ok(())
        }
        ValueType::LlVar | ValueType::LllVar | ValueType::LlllVar => {
            let text = value.as_text().ok_or_else(wrong)?;
            let count = text.chars().count();
            check_max(position, count, length)?;
            packager.encode_length(ctx, count, prefix_digits(value_type), out)?;
            packager.encode_text(ctx, text, out)
        }
        ValueType::LlBin | ValueType::LllBin | ValueType::LlllBin => {
            let bytes = value.as_binary().ok_or_else(wrong)?;
            check_max(position, bytes.len(), length)?;
            packager.encode_length(ctx, bytes.len(), prefix_digits(value_type), out)?;
            out.put_slice(bytes);
            Ok(())
        }
    }
}

fn unpack_value(
    packager: &dyn FieldPackager,
    ctx: &FieldContext<'_>,
    schema: &FieldSchema,
    reader: &mut FieldReader<'_>,
) -> Result<FieldValue, PackError> {
    let position = ctx.position();
    let value_type = schema.value_type();
    let length = usize::from(schema.length());

    Ok(match value_type {
        ValueType::MessageType => FieldValue::MessageType(packager.decode_message_type(ctx, reader)?),
        ValueType::Bitmap => FieldValue::Bitmap(packager.decode_bitmap(ctx, length, reader)?),
        ValueType::Alpha => {
            let text = packager.decode_text(ctx, reader.take(position, length)?)?;
            FieldValue::Text(text.trim_end_matches(' ').to_string())
        }
        ValueType::Numeric => FieldValue::Text(packager.decode_numeric(ctx, schema.length(), reader)?),
        ValueType::Binary => FieldValue::Binary(Bytes::copy_from_slice(reader.take(position, length)?)),
        ValueType::LlVar | ValueType::LllVar | ValueType::LlllVar => {
            let count = packager.decode_length(ctx, prefix_digits(value_type), reader)?;
            check_max(position, count, length)?;
            FieldValue::Text(packager.decode_text(ctx, reader.take(position, count)?)?)
        }
        ValueType::LlBin | ValueType::LllBin | ValueType::LlllBin => {
            let count = packager.decode_length(ctx, prefix_digits(value_type), reader)?;
            check_max(position, count, length)?;
            FieldValue::Binary(Bytes::copy_from_slice(reader.take(position, count)?))
        }
    })
}

#[inline]
fn prefix_digits(value_type: ValueType) -> u8 {
    value_type.prefix_digits().unwrap_or(0)
}

/// Width of a constructed field's sub-bitmap: one bit per declared position.
fn sub_bitmap_len(schema: &FieldSchema) -> usize {
    schema
        .highest_sub_field()
        .map_or(0, |highest| usize::from(highest).div_ceil(8))
}

fn pack_compound(
    packager: &dyn FieldPackager,
    ctx: &FieldContext<'_>,
    schema: &FieldSchema,
    subs: &SubFields,
    out: &mut BytesMut,
) -> Result<(), PackError> {
    let position = ctx.position();
    for (sub_position, _) in subs.iter() {
        if schema.sub_field(sub_position)?.is_none() {
            return Err(PackError::NoFieldSchema {
                position: sub_position,
            });
        }
    }

    let mut body = BytesMut::new();
    match schema.field_type() {
        FieldType::Constructed => {
            let mut bitmap = Bitmap::new(sub_bitmap_len(schema));
            for (sub_position, _) in subs.iter() {
                bitmap.set(usize::from(sub_position) - 1);
            }
            packager.encode_bitmap(ctx, &bitmap, &mut body)?;
            for (sub_position, field) in subs.iter() {
                let sub_schema = schema
                    .sub_field(sub_position)?
                    .ok_or(PackError::NoFieldSchema {
                        position: sub_position,
                    })?;
                let sub_ctx = ctx.at(sub_position);
                let sub_packager = ctx.packager_for(sub_schema, packager)?;
                pack_field(sub_packager, &sub_ctx, sub_schema, field, &mut body)?;
            }
        }
        FieldType::Composite | FieldType::Primitive => {
            for (sub_position, sub_schema) in schema.sub_fields() {
                let defaulted;
                let field = match subs.get(sub_position)? {
                    Some(field) => field,
                    None => {
                        defaulted = default_field(sub_position, sub_schema)?.ok_or(
                            PackError::MissingSubField {
                                position,
                                sub_position,
                            },
                        )?;
                        &defaulted
                    }
                };
                let sub_ctx = ctx.at(sub_position);
                let sub_packager = ctx.packager_for(sub_schema, packager)?;
                pack_field(sub_packager, &sub_ctx, sub_schema, field, &mut body)?;
            }
        }
    }

    let length = usize::from(schema.length());
    match schema.value_type().prefix_digits() {
        Some(digits) => {
            check_max(position, body.len(), length)?;
            packager.encode_length(ctx, body.len(), digits, out)?;
        }
        None if body.len() != length => {
            return Err(PackError::LengthMismatch {
                position,
                expected: length,
                actual: body.len(),
            });
        }
        None => {}
    }
    out.put_slice(&body);
    Ok(())
}

fn unpack_compound(
    packager: &dyn FieldPackager,
    ctx: &FieldContext<'_>,
    schema: &FieldSchema,
    reader: &mut FieldReader<'_>,
) -> Result<Field, PackError> {
    let position = ctx.position();
    let length = usize::from(schema.length());
    let count = match schema.value_type().prefix_digits() {
        Some(digits) => {
            let count = packager.decode_length(ctx, digits, reader)?;
            check_max(position, count, length)?;
            count
        }
        None => length,
    };
    let mut body = FieldReader::new(reader.take(position, count)?);

    let mut subs = SubFields::new();
    match schema.field_type() {
        FieldType::Constructed => {
            let bitmap = packager.decode_bitmap(ctx, sub_bitmap_len(schema), &mut body)?;
            for bit in bitmap.iter_set() {
                let sub_position = u16::try_from(bit + 1).unwrap_or(u16::MAX);
                let sub_schema = schema
                    .sub_field(sub_position)?
                    .ok_or(PackError::NoFieldSchema {
                        position: sub_position,
                    })?;
                let sub_ctx = ctx.at(sub_position);
                let sub_packager = ctx.packager_for(sub_schema, packager)?;
                subs.set(
                    sub_position,
                    unpack_field(sub_packager, &sub_ctx, sub_schema, &mut body)?,
                )?;
            }
        }
        FieldType::Composite | FieldType::Primitive => {
            for (sub_position, sub_schema) in schema.sub_fields() {
                let sub_ctx = ctx.at(sub_position);
                let sub_packager = ctx.packager_for(sub_schema, packager)?;
                subs.set(
                    sub_position,
                    unpack_field(sub_packager, &sub_ctx, sub_schema, &mut body)?,
                )?;
            }
        }
    }
    body.finish()?;
    Ok(Field::Composite(subs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::AsciiFieldPackager;

    #[derive(Debug)]
    struct TextOnly;

    impl FieldPackager for TextOnly {
        fn id(&self) -> &str {
            "text-only"
        }
    }

    fn registry() -> FieldPackagerRegistry {
        FieldPackagerRegistry::with_defaults()
    }

    fn pack(schema: &FieldSchema, field: &Field) -> Result<BytesMut, PackError> {
        let registry = registry();
        let ctx = FieldContext::new(Charset::Latin1, &registry).at(48);
        let mut out = BytesMut::new();
        pack_field(&AsciiFieldPackager, &ctx, schema, field, &mut out)?;
        Ok(out)
    }

    fn unpack(schema: &FieldSchema, input: &[u8]) -> Result<Field, PackError> {
        let registry = registry();
        let ctx = FieldContext::new(Charset::Latin1, &registry).at(48);
        let mut reader = FieldReader::new(input);
        let field = unpack_field(&AsciiFieldPackager, &ctx, schema, &mut reader)?;
        reader.finish()?;
        Ok(field)
    }

    #[test]
    fn test_unsupported_hooks() {
        let registry = registry();
        let ctx = FieldContext::new(Charset::Ascii, &registry).at(3);
        let schema = FieldSchema::primitive(ValueType::Numeric, 6).build(3).unwrap();
        let mut out = BytesMut::new();
        let err = pack_field(&TextOnly, &ctx, &schema, &Field::text("1"), &mut out).unwrap_err();
        assert_eq!(
            err,
            PackError::UnsupportedValueType {
                position: 3,
                value_type: "NUMERIC".to_string(),
                packager: "text-only".to_string(),
            }
        );

        let alpha = FieldSchema::primitive(ValueType::Alpha, 3).build(3).unwrap();
        pack_field(&TextOnly, &ctx, &alpha, &Field::text("AB"), &mut out).unwrap();
        assert_eq!(&out[..], b"AB ");
    }

    #[test]
    fn test_alpha_pads_and_trims() {
        let schema = FieldSchema::primitive(ValueType::Alpha, 5).build(48).unwrap();
        let out = pack(&schema, &Field::text("AB")).unwrap();
        assert_eq!(&out[..], b"AB   ");
        assert_eq!(unpack(&schema, &out).unwrap(), Field::text("AB"));
    }

    #[test]
    fn test_value_too_long() {
        let schema = FieldSchema::primitive(ValueType::LlVar, 3).build(48).unwrap();
        assert_eq!(
            pack(&schema, &Field::text("ABCD")).unwrap_err(),
            PackError::FieldTooLong {
                position: 48,
                length: 4,
                max_length: 3
            }
        );
        assert!(matches!(
            unpack(&schema, b"04ABCD"),
            Err(PackError::FieldTooLong { .. })
        ));
    }

    #[test]
    fn test_numeric_rejects_letters() {
        let schema = FieldSchema::primitive(ValueType::Numeric, 4).build(48).unwrap();
        assert!(matches!(
            pack(&schema, &Field::text("12a")),
            Err(PackError::InvalidFieldValue { position: 48, .. })
        ));
    }

    #[test]
    fn test_fixed_binary_length() {
        let schema = FieldSchema::primitive(ValueType::Binary, 4).build(48).unwrap();
        assert_eq!(
            pack(&schema, &Field::binary(vec![1u8, 2])).unwrap_err(),
            PackError::LengthMismatch {
                position: 48,
                expected: 4,
                actual: 2
            }
        );
        let out = pack(&schema, &Field::binary(vec![1u8, 2, 3, 4])).unwrap();
        assert_eq!(unpack(&schema, &out).unwrap(), Field::binary(vec![1u8, 2, 3, 4]));
    }

    #[test]
    fn test_value_kind_mismatch() {
        let schema = FieldSchema::primitive(ValueType::LlBin, 8).build(48).unwrap();
        assert!(matches!(
            pack(&schema, &Field::text("AB")),
            Err(PackError::InvalidFieldValue { position: 48, .. })
        ));
    }

    fn composite_schema() -> FieldSchema {
        FieldSchema::composite(ValueType::LllVar, 999)
            .sub_field(1, FieldSchema::primitive(ValueType::Numeric, 2))
            .sub_field(2, FieldSchema::primitive(ValueType::Alpha, 3).with_default("XYZ"))
            .sub_field(3, FieldSchema::primitive(ValueType::LlVar, 10))
            .build(48)
            .unwrap()
    }

    #[test]
    fn test_composite_packs_every_sub_field() {
        let schema = composite_schema();
        let subs = SubFields::new()
            .with(1, Field::text("7"))
            .unwrap()
            .with(3, Field::text("HELLO"))
            .unwrap();
        let out = pack(&schema, &Field::Composite(subs)).unwrap();
        assert_eq!(&out[..], b"01207XYZ05HELLO");

        let field = unpack(&schema, &out).unwrap();
        let subs = field.sub_fields().unwrap();
        assert_eq!(subs.get(1).unwrap(), Some(&Field::text("07")));
        assert_eq!(subs.get(2).unwrap(), Some(&Field::text("XYZ")));
        assert_eq!(subs.get(3).unwrap(), Some(&Field::text("HELLO")));
    }

    #[test]
    fn test_composite_missing_sub_field() {
        let schema = composite_schema();
        let subs = SubFields::new().with(1, Field::text("7")).unwrap();
        assert_eq!(
            pack(&schema, &Field::Composite(subs)).unwrap_err(),
            PackError::MissingSubField {
                position: 48,
                sub_position: 3
            }
        );
    }

    #[test]
    fn test_composite_undeclared_sub_field() {
        let schema = composite_schema();
        let subs = SubFields::new().with(9, Field::text("7")).unwrap();
        assert_eq!(
            pack(&schema, &Field::Composite(subs)).unwrap_err(),
            PackError::NoFieldSchema { position: 9 }
        );
    }

    #[test]
    fn test_constructed_packs_present_sub_fields() {
        let schema = FieldSchema::constructed(ValueType::LllVar, 999)
            .sub_field(1, FieldSchema::primitive(ValueType::Alpha, 2))
            .sub_field(3, FieldSchema::primitive(ValueType::LlVar, 10))
            .sub_field(10, FieldSchema::primitive(ValueType::Numeric, 4))
            .build(48)
            .unwrap();
        let subs = SubFields::new()
            .with(3, Field::text("HI"))
            .unwrap()
            .with(10, Field::text("0042"))
            .unwrap();
        let out = pack(&schema, &Field::Composite(subs.clone())).unwrap();
        // Bits 2 and 9 of a 2-byte sub-bitmap.
        assert_eq!(&out[..], b"012204002HI0042");
        assert_eq!(unpack(&schema, &out).unwrap(), Field::Composite(subs));
    }

    #[test]
    fn test_composite_trailing_bytes() {
        let schema = FieldSchema::composite(ValueType::LlVar, 20)
            .sub_field(1, FieldSchema::primitive(ValueType::Alpha, 2))
            .build(48)
            .unwrap();
        assert_eq!(
            unpack(&schema, b"04ABCD"),
            Err(PackError::TrailingBytes { count: 2 })
        );
    }

    #[test]
    fn test_sub_field_codec_override() {
        let schema = FieldSchema::composite(ValueType::LllBin, 999)
            .sub_field(1, FieldSchema::primitive(ValueType::Numeric, 4).with_codec("binary"))
            .sub_field(2, FieldSchema::primitive(ValueType::Numeric, 4))
            .build(48)
            .unwrap();
        let subs = SubFields::new()
            .with(1, Field::text("1234"))
            .unwrap()
            .with(2, Field::text("1234"))
            .unwrap();
        let out = pack(&schema, &Field::Composite(subs.clone())).unwrap();
        assert_eq!(&out[..], b"006\x12\x341234");
        assert_eq!(unpack(&schema, &out).unwrap(), Field::Composite(subs));
    }

    #[test]
    fn test_default_field() {
        let text = FieldSchema::primitive(ValueType::Alpha, 3)
            .with_default("ABC")
            .build(2)
            .unwrap();
        assert_eq!(default_field(2, &text).unwrap(), Some(Field::text("ABC")));

        let binary = FieldSchema::primitive(ValueType::Binary, 2)
            .with_default("0A0B")
            .build(2)
            .unwrap();
        assert_eq!(
            default_field(2, &binary).unwrap(),
            Some(Field::binary(vec![0x0Au8, 0x0B]))
        );

        let bad = FieldSchema::primitive(ValueType::Binary, 2)
            .with_default("zz")
            .build(2)
            .unwrap();
        assert!(default_field(2, &bad).is_err());
    }
}

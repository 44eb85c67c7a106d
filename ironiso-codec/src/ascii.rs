/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Character field packager.
//!
//! Message types are four digit characters, bitmaps are uppercase hex (two
//! characters per byte), numerics and length prefixes are decimal characters.

use crate::length::{parse_decimal, put_decimal};
use crate::packager::{FieldContext, FieldPackager};
use crate::reader::FieldReader;
use bytes::{BufMut, BytesMut};
use ironiso_core::{Bitmap, MessageType, PackError, MTI_LENGTH};

/// Registry identifier of [`AsciiFieldPackager`].
pub const ASCII_PACKAGER_ID: &str = "ascii";

/// Field packager for character-oriented dialects.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFieldPackager;

impl FieldPackager for AsciiFieldPackager {
    fn id(&self) -> &str {
        ASCII_PACKAGER_ID
    }

    fn encode_message_type(
        &self,
        _ctx: &FieldContext<'_>,
        mti: &MessageType,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        out.put_slice(mti.encode().as_bytes());
        Ok(())
    }

    fn decode_message_type(
        &self,
        ctx: &FieldContext<'_>,
        reader: &mut FieldReader<'_>,
    ) -> Result<MessageType, PackError> {
        MessageType::decode_bytes(reader.take(ctx.position(), MTI_LENGTH)?)
    }

    fn encode_bitmap(
        &self,
        _ctx: &FieldContext<'_>,
        bitmap: &Bitmap,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        out.put_slice(hex::encode_upper(bitmap.as_bytes()).as_bytes());
        Ok(())
    }

    fn decode_bitmap(
        &self,
        ctx: &FieldContext<'_>,
        len_bytes: usize,
        reader: &mut FieldReader<'_>,
    ) -> Result<Bitmap, PackError> {
        let text = reader.take(ctx.position(), len_bytes * 2)?;
        let bytes = hex::decode(text).map_err(|e| PackError::InvalidFieldValue {
            position: ctx.position(),
            reason: format!("bitmap is not hex: {e}"),
        })?;
        Ok(Bitmap::from_bytes(&bytes))
    }

    fn encode_numeric(
        &self,
        _ctx: &FieldContext<'_>,
        digits: &str,
        length: u16,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        out.put_bytes(b'0', usize::from(length).saturating_sub(digits.len()));
        out.put_slice(digits.as_bytes());
        Ok(())
    }

    fn decode_numeric(
        &self,
        ctx: &FieldContext<'_>,
        length: u16,
        reader: &mut FieldReader<'_>,
    ) -> Result<String, PackError> {
        let digits = reader.take(ctx.position(), usize::from(length))?;
        if let Some(bad) = digits.iter().find(|b| !b.is_ascii_digit()) {
            return Err(PackError::InvalidFieldValue {
                position: ctx.position(),
                reason: format!("byte 0x{bad:02X} is not a decimal digit"),
            });
        }
        Ok(digits.iter().map(|b| char::from(*b)).collect())
    }

    fn encode_length(
        &self,
        _ctx: &FieldContext<'_>,
        length: usize,
        digits: u8,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        put_decimal(out, length, digits)
    }

    fn decode_length(
        &self,
        ctx: &FieldContext<'_>,
        digits: u8,
        reader: &mut FieldReader<'_>,
    ) -> Result<usize, PackError> {
        let prefix = reader.take(ctx.position(), usize::from(digits))?;
        parse_decimal(prefix).ok_or_else(|| PackError::InvalidFieldValue {
            position: ctx.position(),
            reason: format!(
                "malformed length prefix {:?}",
                String::from_utf8_lossy(prefix)
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::{pack_field, unpack_field};
    use crate::registry::FieldPackagerRegistry;
    use ironiso_core::{Charset, Field};
    use ironiso_schema::{FieldSchema, ValueType};

    fn round_trip(value_type: ValueType, length: u16, field: Field) -> (Vec<u8>, Field) {
        let registry = FieldPackagerRegistry::with_defaults();
        let ctx = FieldContext::new(Charset::Latin1, &registry).at(2);
        let schema = FieldSchema::primitive(value_type, length).build(2).unwrap();
        let mut out = BytesMut::new();
        pack_field(&AsciiFieldPackager, &ctx, &schema, &field, &mut out).unwrap();
        let mut reader = FieldReader::new(&out);
        let back = unpack_field(&AsciiFieldPackager, &ctx, &schema, &mut reader).unwrap();
        assert!(reader.is_empty());
        (out.to_vec(), back)
    }

    #[test]
    fn test_numeric() {
        let (wire, back) = round_trip(ValueType::Numeric, 6, Field::text("42"));
        assert_eq!(wire, b"000042");
        assert_eq!(back, Field::text("000042"));
    }

    #[test]
    fn test_llvar() {
        let (wire, back) = round_trip(ValueType::LlVar, 19, Field::text("4111111111111111"));
        assert_eq!(wire, b"164111111111111111");
        assert_eq!(back, Field::text("4111111111111111"));
    }

    #[test]
    fn test_lllvar_and_llllvar() {
        let (wire, _) = round_trip(ValueType::LllVar, 999, Field::text("abc"));
        assert_eq!(wire, b"003abc");
        let (wire, _) = round_trip(ValueType::LlllVar, 999, Field::text("abc"));
        assert_eq!(wire, b"0003abc");
    }

    #[test]
    fn test_binary_payloads() {
        let (wire, back) = round_trip(ValueType::LlBin, 8, Field::binary(vec![0u8, 0xFF]));
        assert_eq!(wire, b"02\x00\xFF");
        assert_eq!(back, Field::binary(vec![0u8, 0xFF]));
        let (wire, _) = round_trip(ValueType::LllBin, 8, Field::binary(vec![1u8]));
        assert_eq!(wire, b"001\x01");
    }

    #[test]
    fn test_latin1_text() {
        let (wire, back) = round_trip(ValueType::Alpha, 4, Field::text("café"));
        assert_eq!(wire, b"caf\xE9");
        assert_eq!(back, Field::text("café"));
    }

    #[test]
    fn test_unencodable() {
        let registry = FieldPackagerRegistry::with_defaults();
        let ctx = FieldContext::new(Charset::Ascii, &registry).at(43);
        let schema = FieldSchema::primitive(ValueType::Alpha, 4).build(43).unwrap();
        let mut out = BytesMut::new();
        let err = pack_field(&AsciiFieldPackager, &ctx, &schema, &Field::text("é"), &mut out)
            .unwrap_err();
        assert_eq!(
            err,
            PackError::Unencodable {
                position: 43,
                character: 'é',
                charset: "US-ASCII".to_string()
            }
        );
    }

    #[test]
    fn test_bitmap_hex() {
        let registry = FieldPackagerRegistry::with_defaults();
        let ctx = FieldContext::new(Charset::Ascii, &registry).at(1);
        let mut bitmap = Bitmap::new(8);
        bitmap.set(2);
        bitmap.set(10);
        let mut out = BytesMut::new();
        AsciiFieldPackager.encode_bitmap(&ctx, &bitmap, &mut out).unwrap();
        assert_eq!(&out[..], b"2020000000000000");

        let mut reader = FieldReader::new(&out);
        let back = AsciiFieldPackager.decode_bitmap(&ctx, 8, &mut reader).unwrap();
        assert_eq!(back, bitmap);

        let mut reader = FieldReader::new(b"ZZ");
        assert!(matches!(
            AsciiFieldPackager.decode_bitmap(&ctx, 1, &mut reader),
            Err(PackError::InvalidFieldValue { position: 1, .. })
        ));
    }

    #[test]
    fn test_malformed_length_prefix() {
        let registry = FieldPackagerRegistry::with_defaults();
        let ctx = FieldContext::new(Charset::Ascii, &registry).at(2);
        let mut reader = FieldReader::new(b"1x");
        assert!(matches!(
            AsciiFieldPackager.decode_length(&ctx, 2, &mut reader),
            Err(PackError::InvalidFieldValue { position: 2, .. })
        ));
    }
}

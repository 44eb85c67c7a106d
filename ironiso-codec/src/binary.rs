/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Binary field packager.
//!
//! Message types are 2 bytes of BCD, bitmaps are raw bytes, numerics are
//! packed BCD left-padded to an even digit count, and variable-length
//! prefixes are BCD of `ceil(digits / 2)` bytes.

use crate::length::{bcd_len, parse_bcd, put_bcd};
use crate::packager::{FieldContext, FieldPackager};
use crate::reader::FieldReader;
use bytes::BytesMut;
use ironiso_core::{Bitmap, MTI_LENGTH, MessageType, PackError};

/// Registry identifier of [`BinaryFieldPackager`].
pub const BINARY_PACKAGER_ID: &str = "binary";

/// Field packager for byte-oriented dialects.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryFieldPackager;

impl BinaryFieldPackager {
    fn read_bcd(
        ctx: &FieldContext<'_>,
        digits: usize,
        reader: &mut FieldReader<'_>,
    ) -> Result<String, PackError> {
        let bytes = reader.take(ctx.position(), bcd_len(digits))?;
        parse_bcd(bytes, digits).ok_or_else(|| PackError::InvalidFieldValue {
            position: ctx.position(),
            reason: format!("malformed BCD {}", hex::encode_upper(bytes)),
        })
    }
}

impl FieldPackager for BinaryFieldPackager {
    fn id(&self) -> &str {
        BINARY_PACKAGER_ID
    }

    fn encode_message_type(
        &self,
        ctx: &FieldContext<'_>,
        mti: &MessageType,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        put_bcd(out, mti.encode().as_bytes(), ctx.position())
    }

    fn decode_message_type(
        &self,
        ctx: &FieldContext<'_>,
        reader: &mut FieldReader<'_>,
    ) -> Result<MessageType, PackError> {
        MessageType::decode(&Self::read_bcd(ctx, MTI_LENGTH, reader)?)
    }

    fn encode_bitmap(
        &self,
        _ctx: &FieldContext<'_>,
        bitmap: &Bitmap,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        out.extend_from_slice(bitmap.as_bytes());
        Ok(())
    }

    fn decode_bitmap(
        &self,
        ctx: &FieldContext<'_>,
        len_bytes: usize,
        reader: &mut FieldReader<'_>,
    ) -> Result<Bitmap, PackError> {
        Ok(Bitmap::from_bytes(reader.take(ctx.position(), len_bytes)?))
    }

    fn encode_numeric(
        &self,
        ctx: &FieldContext<'_>,
        digits: &str,
        length: u16,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        let length = usize::from(length);
        let mut padded = String::with_capacity(length);
        padded.extend(std::iter::repeat_n('0', length.saturating_sub(digits.len())));
        padded.push_str(digits);
        put_bcd(out, padded.as_bytes(), ctx.position())
    }

    fn decode_numeric(
        &self,
        ctx: &FieldContext<'_>,
        length: u16,
        reader: &mut FieldReader<'_>,
    ) -> Result<String, PackError> {
        Self::read_bcd(ctx, usize::from(length), reader)
    }

    fn encode_length(
        &self,
        ctx: &FieldContext<'_>,
        length: usize,
        digits: u8,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        let mut buf = BytesMut::new();
        crate::length::put_decimal(&mut buf, length, digits)?;
        put_bcd(out, &buf, ctx.position())
    }

    fn decode_length(
        &self,
        ctx: &FieldContext<'_>,
        digits: u8,
        reader: &mut FieldReader<'_>,
    ) -> Result<usize, PackError> {
        let text = Self::read_bcd(ctx, usize::from(digits), reader)?;
        text.parse().map_err(|_| PackError::InvalidFieldValue {
            position: ctx.position(),
            reason: format!("malformed length prefix {text:?}"),
        })
    }
}

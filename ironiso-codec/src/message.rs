/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message packager.
//!
//! Frame layout:
//!
//! ```text
//! [length prefix][header][type][bitmap][field 2 .. field 128][trailer]
//!                \____________ counted by the prefix ______/
//! ```
//!
//! The bitmap width follows the schema's [`BitmapLayout`]; field positions
//! map to bits through its [`BitmapNumbering`]. Headers must match the
//! schema's [`HeaderKind`] and unpack as that same variant.

use crate::length::LengthPrefix;
use crate::packager::{FieldContext, FieldPackager, default_field, pack_field, unpack_field};
use crate::reader::FieldReader;
use crate::registry::FieldPackagerRegistry;
use bytes::{BufMut, Bytes, BytesMut};
use ironiso_core::{
    Bitmap, Direction, FIRST_DATA_FIELD, Field, Header, IsoMessage, MAX_FIELD_POSITION,
    PackError, ValidationError,
};
use ironiso_schema::{
    BitmapLayout, BitmapNumbering, FieldSchema, HeaderKind, MessageSchema, ProtocolSchema,
};
use std::borrow::Cow;
use std::sync::Arc;

/// Width of one ISO bitmap block in bytes.
const ISO_BITMAP_BLOCK: usize = 8;

/// Highest position a primary ISO bitmap covers.
const ISO_PRIMARY_MAX: u16 = 64;

/// Converts messages to frames and back for one protocol schema.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MessagePackager {
    schema: Arc<ProtocolSchema>,
    registry: Arc<FieldPackagerRegistry>,
    prefix: LengthPrefix,
    type_field: FieldSchema,
    bitmap_field: FieldSchema,
}

impl MessagePackager {
    /// Creates a packager.
    ///
    /// The type indicator of every message is packed with the first
    /// position-0 schema any message schema declares, or the default one.
    /// Message schemas that omit position 1 get the default bitmap schema.
    ///
    /// # Errors
    /// Returns a `ValidationError` if the schema is invalid or names a
    /// field codec the registry lacks.
    pub fn new(
        schema: Arc<ProtocolSchema>,
        registry: Arc<FieldPackagerRegistry>,
    ) -> Result<Self, ValidationError> {
        schema.validate()?;
        registry.check_schema(&schema)?;
        let type_field = schema
            .message_schemas()
            .find_map(|(_, message)| message.field(0).ok().flatten())
            .cloned()
            .unwrap_or_else(FieldSchema::default_message_type);
        Ok(Self {
            prefix: LengthPrefix::from_schema(&schema),
            schema,
            registry,
            type_field,
            bitmap_field: FieldSchema::default_bitmap(),
        })
    }

    /// Creates a packager with the built-in field packagers.
    ///
    /// # Errors
    /// Returns a `ValidationError` if the schema is invalid.
    pub fn with_defaults(schema: Arc<ProtocolSchema>) -> Result<Self, ValidationError> {
        Self::new(schema, Arc::new(FieldPackagerRegistry::with_defaults()))
    }

    /// Returns the protocol schema.
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<ProtocolSchema> {
        &self.schema
    }

    /// Returns the field packager registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<FieldPackagerRegistry> {
        &self.registry
    }

    /// Returns the frame length prefix.
    #[inline]
    #[must_use]
    pub const fn length_prefix(&self) -> LengthPrefix {
        self.prefix
    }

    fn context(&self) -> FieldContext<'_> {
        FieldContext::new(self.schema.charset(), &self.registry)
    }

    fn default_packager(&self) -> Result<&dyn FieldPackager, PackError> {
        let id = self.schema.codec().field_codec();
        self.registry
            .get(id)
            .ok_or_else(|| PackError::InvalidFieldValue {
                position: 0,
                reason: format!("field codec '{id}' is not registered"),
            })
    }

    fn bitmap_packager<'p>(
        &'p self,
        ctx: &FieldContext<'p>,
        message: &MessageSchema,
        default: &'p dyn FieldPackager,
    ) -> Result<&'p dyn FieldPackager, PackError> {
        let schema = message.field(1)?.unwrap_or(&self.bitmap_field);
        ctx.packager_for(schema, default)
    }

    /// Packs a message into a frame.
    ///
    /// Fields the message omits are packed with their schema default, if
    /// any, and marked present in the bitmap. The message is not modified.
    ///
    /// # Errors
    /// Returns a `PackError` if no message schema applies, a present field
    /// has no schema, or any field fails to pack.
    pub fn pack(&self, message: &IsoMessage) -> Result<Bytes, PackError> {
        let mti = message.mti().encode();
        let message_schema = self
            .schema
            .message_schema(&mti)
            .ok_or_else(|| PackError::NoMessageSchema(mti.to_string()))?;
        let fields = effective_fields(message, message_schema)?;

        let ctx = self.context();
        let default = self.default_packager()?;
        let mut body = BytesMut::with_capacity(256);

        self.put_header(&ctx, default, message.header(), &mut body)?;
        ctx.packager_for(&self.type_field, default)?
            .encode_message_type(&ctx, message.mti(), &mut body)?;

        let bitmap = self.build_bitmap(message_schema, fields.iter().map(|(p, ..)| *p));
        self.bitmap_packager(&ctx, message_schema, default)?
            .encode_bitmap(&ctx.at(1), &bitmap, &mut body)?;

        for (position, schema, field) in &fields {
            let packager = ctx.packager_for(schema, default)?;
            pack_field(packager, &ctx.at(*position), schema, field, &mut body)?;
        }

        let trailer = match (self.schema.has_trailer(), message.trailer()) {
            (true, None) => {
                return Err(PackError::InvalidFieldValue {
                    position: 0,
                    reason: "the protocol requires a trailer byte".to_string(),
                });
            }
            (false, Some(_)) => {
                return Err(PackError::InvalidFieldValue {
                    position: 0,
                    reason: "the protocol declares no trailer".to_string(),
                });
            }
            (_, trailer) => trailer,
        };

        let mut frame = BytesMut::with_capacity(self.prefix.width() + body.len() + 1);
        self.prefix.encode(body.len(), &mut frame)?;
        frame.extend_from_slice(&body);
        if let Some(byte) = trailer {
            frame.put_u8(byte);
        }
        Ok(frame.freeze())
    }

    /// Unpacks one complete frame.
    ///
    /// The returned message is marked inbound.
    ///
    /// # Errors
    /// Returns `PackError::Truncated` for a short frame,
    /// `PackError::TrailingBytes` for unread bytes, `PackError::NoFieldSchema`
    /// for a set bit without a schema, or any field error.
    pub fn unpack(&self, frame: &[u8]) -> Result<IsoMessage, PackError> {
        let mut reader = FieldReader::new(frame);
        let length = self.prefix.decode(&mut reader)?;
        let mut body = FieldReader::new(reader.take(0, length)?);
        let trailer = if self.schema.has_trailer() {
            Some(reader.take(0, 1)?[0])
        } else {
            None
        };
        reader.finish()?;

        let ctx = self.context();
        let default = self.default_packager()?;

        let header = self.read_header(&ctx, default, &mut body)?;
        let mti = ctx
            .packager_for(&self.type_field, default)?
            .decode_message_type(&ctx, &mut body)?;
        let encoded = mti.encode();
        let message_schema = self
            .schema
            .message_schema(&encoded)
            .ok_or_else(|| PackError::NoMessageSchema(encoded.to_string()))?;

        let bitmap_packager = self.bitmap_packager(&ctx, message_schema, default)?;
        let bitmap = self.read_bitmap(&ctx.at(1), message_schema, bitmap_packager, &mut body)?;

        let mut message = IsoMessage::new(mti).with_direction(Direction::Inbound);
        let layout = self.schema.bitmap_layout();
        let numbering = self.schema.bitmap_numbering();
        for bit in bitmap.iter_set() {
            if layout == BitmapLayout::Iso && bit == 0 {
                continue;
            }
            let position = u16::try_from(numbering.position_for(bit)).unwrap_or(u16::MAX);
            if position < FIRST_DATA_FIELD {
                return Err(PackError::NoFieldSchema { position });
            }
            let schema = message_schema
                .field(position)?
                .ok_or(PackError::NoFieldSchema { position })?;
            let packager = ctx.packager_for(schema, default)?;
            let field = unpack_field(packager, &ctx.at(position), schema, &mut body)?;
            message.set_field(position, field)?;
        }
        body.finish()?;

        message.set_header(header);
        message.set_trailer(trailer);
        Ok(message)
    }

    fn put_header(
        &self,
        ctx: &FieldContext<'_>,
        packager: &dyn FieldPackager,
        header: Option<&Header>,
        out: &mut BytesMut,
    ) -> Result<(), PackError> {
        let start = out.len();
        match (self.schema.header_kind(), header) {
            (HeaderKind::Text, Some(Header::Text(text))) => packager.encode_text(ctx, text, out)?,
            (HeaderKind::Binary, Some(Header::Binary(bytes))) => out.extend_from_slice(bytes),
            (kind, Some(_)) => {
                return Err(PackError::InvalidFieldValue {
                    position: 0,
                    reason: format!("header variant does not match the declared {kind:?} kind"),
                });
            }
            (_, None) => {}
        }
        let actual = out.len() - start;
        let expected = self.schema.header_length();
        if actual != expected {
            return Err(PackError::InvalidFieldValue {
                position: 0,
                reason: format!("header is {actual} bytes, the protocol declares {expected}"),
            });
        }
        Ok(())
    }

    fn read_header(
        &self,
        ctx: &FieldContext<'_>,
        packager: &dyn FieldPackager,
        body: &mut FieldReader<'_>,
    ) -> Result<Option<Header>, PackError> {
        let length = self.schema.header_length();
        if length == 0 {
            return Ok(None);
        }
        let bytes = body.take(0, length)?;
        Ok(Some(match self.schema.header_kind() {
            HeaderKind::Text => Header::Text(packager.decode_text(ctx, bytes)?),
            HeaderKind::Binary => Header::Binary(Bytes::copy_from_slice(bytes)),
        }))
    }

    fn build_bitmap(
        &self,
        message: &MessageSchema,
        positions: impl Iterator<Item = u16> + Clone,
    ) -> Bitmap {
        let numbering = self.schema.bitmap_numbering();
        let mut bitmap = match self.schema.bitmap_layout() {
            BitmapLayout::Declared => Bitmap::new(declared_width(message, numbering)),
            BitmapLayout::Iso => {
                let secondary = positions.clone().any(|p| p > ISO_PRIMARY_MAX);
                let mut bitmap = Bitmap::new(ISO_BITMAP_BLOCK * (1 + usize::from(secondary)));
                if secondary {
                    bitmap.set(0);
                }
                bitmap
            }
        };
        for position in positions {
            bitmap.set(numbering.bit_for(position));
        }
        bitmap
    }

    fn read_bitmap(
        &self,
        ctx: &FieldContext<'_>,
        message: &MessageSchema,
        packager: &dyn FieldPackager,
        body: &mut FieldReader<'_>,
    ) -> Result<Bitmap, PackError> {
        match self.schema.bitmap_layout() {
            BitmapLayout::Declared => packager.decode_bitmap(
                ctx,
                declared_width(message, self.schema.bitmap_numbering()),
                body,
            ),
            BitmapLayout::Iso => {
                let mut bitmap = packager.decode_bitmap(ctx, ISO_BITMAP_BLOCK, body)?;
                if bitmap.is_set(0) {
                    let secondary = packager.decode_bitmap(ctx, ISO_BITMAP_BLOCK, body)?;
                    bitmap.extend(&secondary);
                }
                Ok(bitmap)
            }
        }
    }
}

/// Bitmap width covering the highest declared data position; 0 if none.
fn declared_width(message: &MessageSchema, numbering: BitmapNumbering) -> usize {
    message
        .highest_position()
        .filter(|highest| *highest >= FIRST_DATA_FIELD)
        .map_or(0, |highest| (numbering.bit_for(highest) + 1).div_ceil(8))
}

/// Present fields plus schema defaults, in ascending position order.
fn effective_fields<'m>(
    message: &'m IsoMessage,
    schema: &'m MessageSchema,
) -> Result<Vec<(u16, &'m FieldSchema, Cow<'m, Field>)>, PackError> {
    let mut fields = Vec::new();
    for position in FIRST_DATA_FIELD..=MAX_FIELD_POSITION {
        let field_schema = schema.field(position)?;
        match (message.field(position)?, field_schema) {
            (Some(field), Some(field_schema)) => {
                fields.push((position, field_schema, Cow::Borrowed(field)));
            }
            (Some(_), None) => return Err(PackError::NoFieldSchema { position }),
            (None, Some(field_schema)) => {
                if let Some(field) = default_field(position, field_schema)? {
                    fields.push((position, field_schema, Cow::Owned(field)));
                }
            }
            (None, None) => {}
        }
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironiso_core::MessageType;
    use crate::binary::BINARY_PACKAGER_ID;
    use ironiso_schema::{KnownSchema, MessageCodec, ValueType};
    use proptest::prelude::*;

    fn packager(schema: ProtocolSchema) -> MessagePackager {
        MessagePackager::with_defaults(Arc::new(schema)).unwrap()
    }

    fn message(mti: &str) -> IsoMessage {
        IsoMessage::new(mti.parse::<MessageType>().unwrap())
    }

    fn empty_schema() -> ProtocolSchema {
        ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .message("****", MessageSchema::builder())
            .build()
            .unwrap()
    }

    fn terminal_schema() -> ProtocolSchema {
        ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .message(
                "****",
                MessageSchema::builder()
                    .field(11, FieldSchema::primitive(ValueType::Numeric, 6))
                    .field(41, FieldSchema::primitive(ValueType::Alpha, 8))
                    .field(64, FieldSchema::primitive(ValueType::Alpha, 1)),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_type_only_frame() {
        let packager = packager(empty_schema());
        let frame = packager.pack(&message("0800")).unwrap();
        assert_eq!(&frame[..], b"00040800");

        let back = packager.unpack(&frame).unwrap();
        assert_eq!(back.mti().encode().as_str(), "0800");
        assert_eq!(back.direction(), Direction::Inbound);
        assert_eq!(back.field_count(), 0);
    }

    #[test]
    fn test_declared_bitmap_width() {
        let packager = packager(terminal_schema());
        let mut msg = message("0800");
        msg.set_text(11, "000001").unwrap();
        msg.set_text(41, "TERM0001").unwrap();

        let frame = packager.pack(&msg).unwrap();
        assert_eq!(&frame[..], b"003408000020000000800000000001TERM0001");

        let back = packager.unpack(&frame).unwrap();
        assert_eq!(back.text(11), Some("000001"));
        assert_eq!(back.text(41), Some("TERM0001"));
        assert!(!back.has_field(64));
    }

    #[test]
    fn test_bitmap_schema_selects_codec() {
        let declared = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .message(
                "02**",
                MessageSchema::builder()
                    .field(
                        1,
                        FieldSchema::primitive(ValueType::Bitmap, 8)
                            .with_codec(BINARY_PACKAGER_ID),
                    )
                    .field(11, FieldSchema::primitive(ValueType::Numeric, 6)),
            )
            .message(
                "****",
                MessageSchema::builder().field(11, FieldSchema::primitive(ValueType::Numeric, 6)),
            )
            .build()
            .unwrap();
        let packager = packager(declared);

        let mut msg = message("0200");
        msg.set_text(11, "000001").unwrap();
        let frame = packager.pack(&msg).unwrap();
        assert_eq!(&frame[..], b"00120200\x00\x20000001");
        assert_eq!(packager.unpack(&frame).unwrap().text(11), Some("000001"));

        let mut msg = message("0800");
        msg.set_text(11, "000001").unwrap();
        let frame = packager.pack(&msg).unwrap();
        assert_eq!(&frame[..], b"001408000020000001");
    }

    #[test]
    fn test_field_minus_two_numbering() {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .bitmap_numbering(BitmapNumbering::FieldMinusTwo)
            .message(
                "****",
                MessageSchema::builder()
                    .field(2, FieldSchema::primitive(ValueType::Alpha, 1))
                    .field(9, FieldSchema::primitive(ValueType::Alpha, 1)),
            )
            .build()
            .unwrap();
        let packager = packager(schema);
        let mut msg = message("0200");
        msg.set_text(2, "A").unwrap();
        msg.set_text(9, "B").unwrap();

        let frame = packager.pack(&msg).unwrap();
        assert_eq!(&frame[..], b"0008020081AB");
        let back = packager.unpack(&frame).unwrap();
        assert_eq!(back.text(2), Some("A"));
        assert_eq!(back.text(9), Some("B"));
    }

    #[test]
    fn test_iso_secondary_bitmap() {
        let packager = packager(KnownSchema::Iso87Ascii.schema().unwrap());
        let mut msg = message("0800");
        msg.set_text(7, "1019123000").unwrap();
        msg.set_text(11, "000001").unwrap();
        msg.set_text(70, "301").unwrap();

        let frame = packager.pack(&msg).unwrap();
        let expected = concat!(
            "0055",
            "0800",
            "8220000000000000",
            "0400000000000000",
            "1019123000",
            "000001",
            "301"
        );
        assert_eq!(&frame[..], expected.as_bytes());

        let back = packager.unpack(&frame).unwrap();
        assert_eq!(back.text(7), Some("1019123000"));
        assert_eq!(back.text(11), Some("000001"));
        assert_eq!(back.text(70), Some("301"));
    }

    #[test]
    fn test_iso_primary_only() {
        let packager = packager(KnownSchema::Iso87Ascii.schema().unwrap());
        let mut msg = message("0800");
        msg.set_text(11, "000001").unwrap();
        let frame = packager.pack(&msg).unwrap();
        assert_eq!(&frame[..], b"002608000020000000000000000001");
    }

    #[test]
    fn test_binary_codec_frame() {
        let packager = packager(KnownSchema::Iso87Binary.schema().unwrap());
        let mut msg = message("0800");
        msg.set_text(11, "000001").unwrap();
        msg.set_text(70, "301").unwrap();

        let frame = packager.pack(&msg).unwrap();
        let mut expected = vec![0x00, 0x17, 0x08, 0x00];
        expected.extend_from_slice(&[0x80, 0x20, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(&[0x04, 0, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(&[0x00, 0x00, 0x01, 0x03, 0x01]);
        assert_eq!(&frame[..], expected.as_slice());

        let back = packager.unpack(&frame).unwrap();
        assert_eq!(back.text(11), Some("000001"));
        assert_eq!(back.text(70), Some("301"));
    }

    #[test]
    fn test_defaults_fill_absent_fields() {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .message(
                "****",
                MessageSchema::builder()
                    .field(11, FieldSchema::primitive(ValueType::Numeric, 6))
                    .field(
                        41,
                        FieldSchema::primitive(ValueType::Alpha, 8).with_default("TERM0001"),
                    ),
            )
            .build()
            .unwrap();
        let packager = packager(schema);
        let mut msg = message("0800");
        msg.set_text(11, "000001").unwrap();

        let frame = packager.pack(&msg).unwrap();
        assert!(!msg.has_field(41));

        let back = packager.unpack(&frame).unwrap();
        assert_eq!(back.text(41), Some("TERM0001"));
    }

    #[test]
    fn test_truncated_frame() {
        let packager = packager(empty_schema());
        assert_eq!(
            packager.unpack(b"00100800"),
            Err(PackError::Truncated {
                position: 0,
                needed: 10,
                available: 4
            })
        );
        assert!(matches!(
            packager.unpack(b"000"),
            Err(PackError::Truncated { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes() {
        let packager = packager(empty_schema());
        assert_eq!(
            packager.unpack(b"00040800XX"),
            Err(PackError::TrailingBytes { count: 2 })
        );
        assert_eq!(
            packager.unpack(b"00060800XX"),
            Err(PackError::TrailingBytes { count: 2 })
        );
    }

    #[test]
    fn test_truncated_field() {
        let packager = packager(terminal_schema());
        assert!(matches!(
            packager.unpack(b"002008000020000000000000"),
            Err(PackError::Truncated { position: 11, .. })
        ));
    }

    #[test]
    fn test_bit_without_field_schema() {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .bitmap_layout(BitmapLayout::Iso)
            .message(
                "****",
                MessageSchema::builder().field(11, FieldSchema::primitive(ValueType::Numeric, 6)),
            )
            .build()
            .unwrap();
        let packager = packager(schema);
        assert_eq!(
            packager.unpack(b"002008002000000000000000"),
            Err(PackError::NoFieldSchema { position: 3 })
        );

        let mut msg = message("0800");
        msg.set_text(3, "000000").unwrap();
        assert_eq!(
            packager.pack(&msg),
            Err(PackError::NoFieldSchema { position: 3 })
        );
    }

    #[test]
    fn test_no_message_schema() {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .message("08**", MessageSchema::builder())
            .build()
            .unwrap();
        let packager = packager(schema);
        assert_eq!(
            packager.pack(&message("0200")),
            Err(PackError::NoMessageSchema("0200".to_string()))
        );
        assert_eq!(
            packager.unpack(b"00040200"),
            Err(PackError::NoMessageSchema("0200".to_string()))
        );
    }

    #[test]
    fn test_header_and_trailer() {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .header_length(4)
            .trailer(true)
            .message("****", MessageSchema::builder())
            .build()
            .unwrap();
        let packager = packager(schema);
        let msg = message("0800")
            .with_header(Header::Text("ISO1".to_string()))
            .with_trailer(0x03);

        let frame = packager.pack(&msg).unwrap();
        assert_eq!(&frame[..], b"0008ISO10800\x03");

        let back = packager.unpack(&frame).unwrap();
        assert_eq!(back.header(), Some(&Header::Text("ISO1".to_string())));
        assert_eq!(back.trailer(), Some(0x03));

        assert!(packager.pack(&message("0800").with_trailer(0x03)).is_err());
        assert!(
            packager
                .pack(&message("0800").with_header(Header::Text("ISO".to_string())))
                .is_err()
        );
        assert!(matches!(
            packager.unpack(b"0008ISO10800"),
            Err(PackError::Truncated { .. })
        ));
    }

    #[test]
    fn test_header_kind_preserved() {
        let text_header = ProtocolSchema::builder()
            .codec(MessageCodec::Binary)
            .length_digits(2)
            .header_length(3)
            .header_kind(HeaderKind::Text)
            .message("****", MessageSchema::builder())
            .build()
            .unwrap();
        let packager = packager(text_header);
        let msg = message("0800").with_header(Header::Text("ISO".to_string()));

        let frame = packager.pack(&msg).unwrap();
        assert_eq!(&frame[..], b"\x00\x05ISO\x08\x00");
        let back = packager.unpack(&frame).unwrap();
        assert_eq!(back.header(), Some(&Header::Text("ISO".to_string())));

        let raw = message("0800").with_header(Header::Binary(Bytes::from_static(b"ISO")));
        assert!(matches!(
            packager.pack(&raw),
            Err(PackError::InvalidFieldValue { position: 0, .. })
        ));

        let ascii = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .header_length(2)
            .message("****", MessageSchema::builder())
            .build()
            .unwrap();
        let raw = message("0800").with_header(Header::Binary(Bytes::from_static(&[0x60, 0x01])));
        assert!(self::packager(ascii).pack(&raw).is_err());
    }

    #[test]
    fn test_unknown_codec_rejected() {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .message(
                "****",
                MessageSchema::builder().field(
                    2,
                    FieldSchema::primitive(ValueType::Numeric, 4).with_codec("ebcdic"),
                ),
            )
            .build()
            .unwrap();
        assert_eq!(
            MessagePackager::with_defaults(Arc::new(schema)).unwrap_err(),
            ValidationError::UnknownCodec {
                position: 2,
                codec: "ebcdic".to_string()
            }
        );
    }

    fn wide_schema() -> ProtocolSchema {
        let elements = (FIRST_DATA_FIELD..=MAX_FIELD_POSITION).fold(
            MessageSchema::builder(),
            |builder, position| builder.field(position, FieldSchema::primitive(ValueType::LlVar, 10)),
        );
        ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .bitmap_layout(BitmapLayout::Iso)
            .message("****", elements)
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn prop_bitmap_matches_present_fields(
            positions in proptest::collection::btree_set(FIRST_DATA_FIELD..=MAX_FIELD_POSITION, 0..24)
        ) {
            let packager = packager(wide_schema());
            let mut msg = message("0200");
            for position in &positions {
                msg.set_text(*position, position.to_string()).unwrap();
            }

            let frame = packager.pack(&msg).unwrap();
            let secondary = positions.iter().any(|p| *p > ISO_PRIMARY_MAX);
            prop_assert_eq!(frame[8] >= b'8', secondary);

            let back = packager.unpack(&frame).unwrap();
            let present: Vec<u16> = back.fields().map(|(p, _)| p).collect();
            prop_assert_eq!(present, positions.iter().copied().collect::<Vec<_>>());
            for position in &positions {
                let expected = position.to_string();
                prop_assert_eq!(back.text(*position), Some(expected.as_str()));
            }
        }
    }
}

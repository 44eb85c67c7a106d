/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Ready-made protocol schemas for common ISO 8583 dialects.

use crate::protocol::{BitmapLayout, MessageCodec, ProtocolSchema};
use crate::schema::{FieldSchema, MessageSchema, MessageSchemaBuilder, ValueType};
use ironiso_core::ValidationError;
use serde::{Deserialize, Serialize};

use ValueType::{Alpha, Binary, LlVar, LllVar, Numeric};

/// Data elements 2 through 128 of ISO 8583:1987.
const ISO87_FIELDS: &[(u16, ValueType, u16, &str)] = &[
    (2, LlVar, 19, "Primary Account Number"),
    (3, Numeric, 6, "Processing Code"),
    (4, Numeric, 12, "Amount, Transaction"),
    (5, Numeric, 12, "Amount, Settlement"),
    (6, Numeric, 12, "Amount, Cardholder Billing"),
    (7, Numeric, 10, "Transmission Date and Time"),
    (8, Numeric, 8, "Amount, Cardholder Billing Fee"),
    (9, Numeric, 8, "Conversion Rate, Settlement"),
    (10, Numeric, 8, "Conversion Rate, Cardholder Billing"),
    (11, Numeric, 6, "Systems Trace Audit Number"),
    (12, Numeric, 6, "Time, Local Transaction"),
    (13, Numeric, 4, "Date, Local Transaction"),
    (14, Numeric, 4, "Date, Expiration"),
    (15, Numeric, 4, "Date, Settlement"),
    (16, Numeric, 4, "Date, Conversion"),
    (17, Numeric, 4, "Date, Capture"),
    (18, Numeric, 4, "Merchant Type"),
    (19, Numeric, 3, "Acquiring Institution Country Code"),
    (20, Numeric, 3, "PAN Extended, Country Code"),
    (21, Numeric, 3, "Forwarding Institution Country Code"),
    (22, Numeric, 3, "Point of Service Entry Mode"),
    (23, Numeric, 3, "Card Sequence Number"),
    (24, Numeric, 3, "Network International Identifier"),
    (25, Numeric, 2, "Point of Service Condition Code"),
    (26, Numeric, 2, "Point of Service PIN Capture Code"),
    (27, Numeric, 1, "Authorization Identification Response Length"),
    (28, Alpha, 9, "Amount, Transaction Fee"),
    (29, Alpha, 9, "Amount, Settlement Fee"),
    (30, Alpha, 9, "Amount, Transaction Processing Fee"),
    (31, Alpha, 9, "Amount, Settlement Processing Fee"),
    (32, LlVar, 11, "Acquiring Institution Identification Code"),
    (33, LlVar, 11, "Forwarding Institution Identification Code"),
    (34, LlVar, 28, "Primary Account Number, Extended"),
    (35, LlVar, 37, "Track 2 Data"),
    (36, LllVar, 104, "Track 3 Data"),
    (37, Alpha, 12, "Retrieval Reference Number"),
    (38, Alpha, 6, "Authorization Identification Response"),
    (39, Alpha, 2, "Response Code"),
    (40, Alpha, 3, "Service Restriction Code"),
    (41, Alpha, 8, "Card Acceptor Terminal Identification"),
    (42, Alpha, 15, "Card Acceptor Identification Code"),
    (43, Alpha, 40, "Card Acceptor Name/Location"),
    (44, LlVar, 25, "Additional Response Data"),
    (45, LlVar, 76, "Track 1 Data"),
    (46, LllVar, 999, "Additional Data - ISO"),
    (47, LllVar, 999, "Additional Data - National"),
    (48, LllVar, 999, "Additional Data - Private"),
    (49, Alpha, 3, "Currency Code, Transaction"),
    (50, Alpha, 3, "Currency Code, Settlement"),
    (51, Alpha, 3, "Currency Code, Cardholder Billing"),
    (52, Binary, 8, "Personal Identification Number Data"),
    (53, Numeric, 16, "Security Related Control Information"),
    (54, LllVar, 120, "Additional Amounts"),
    (55, LllVar, 999, "Reserved ISO"),
    (56, LllVar, 999, "Reserved ISO"),
    (57, LllVar, 999, "Reserved National"),
    (58, LllVar, 999, "Reserved National"),
    (59, LllVar, 999, "Reserved National"),
    (60, LllVar, 999, "Reserved National"),
    (61, LllVar, 999, "Reserved Private"),
    (62, LllVar, 999, "Reserved Private"),
    (63, LllVar, 999, "Reserved Private"),
    (64, Binary, 8, "Message Authentication Code"),
    (65, Binary, 1, "Bitmap, Extended"),
    (66, Numeric, 1, "Settlement Code"),
    (67, Numeric, 2, "Extended Payment Code"),
    (68, Numeric, 3, "Receiving Institution Country Code"),
    (69, Numeric, 3, "Settlement Institution Country Code"),
    (70, Numeric, 3, "Network Management Information Code"),
    (71, Numeric, 4, "Message Number"),
    (72, Numeric, 4, "Message Number, Last"),
    (73, Numeric, 6, "Date, Action"),
    (74, Numeric, 10, "Credits, Number"),
    (75, Numeric, 10, "Credits, Reversal Number"),
    (76, Numeric, 10, "Debits, Number"),
    (77, Numeric, 10, "Debits, Reversal Number"),
    (78, Numeric, 10, "Transfer, Number"),
    (79, Numeric, 10, "Transfer, Reversal Number"),
    (80, Numeric, 10, "Inquiries, Number"),
    (81, Numeric, 10, "Authorizations, Number"),
    (82, Numeric, 12, "Credits, Processing Fee Amount"),
    (83, Numeric, 12, "Credits, Transaction Fee Amount"),
    (84, Numeric, 12, "Debits, Processing Fee Amount"),
    (85, Numeric, 12, "Debits, Transaction Fee Amount"),
    (86, Numeric, 16, "Credits, Amount"),
    (87, Numeric, 16, "Credits, Reversal Amount"),
    (88, Numeric, 16, "Debits, Amount"),
    (89, Numeric, 16, "Debits, Reversal Amount"),
    (90, Numeric, 42, "Original Data Elements"),
    (91, Alpha, 1, "File Update Code"),
    (92, Alpha, 2, "File Security Code"),
    (93, Alpha, 5, "Response Indicator"),
    (94, Alpha, 7, "Service Indicator"),
    (95, Alpha, 42, "Replacement Amounts"),
    (96, Binary, 8, "Message Security Code"),
    (97, Alpha, 17, "Amount, Net Settlement"),
    (98, Alpha, 25, "Payee"),
    (99, LlVar, 11, "Settlement Institution Identification Code"),
    (100, LlVar, 11, "Receiving Institution Identification Code"),
    (101, LlVar, 17, "File Name"),
    (102, LlVar, 28, "Account Identification 1"),
    (103, LlVar, 28, "Account Identification 2"),
    (104, LllVar, 100, "Transaction Description"),
    (105, LllVar, 999, "Reserved ISO"),
    (106, LllVar, 999, "Reserved ISO"),
    (107, LllVar, 999, "Reserved ISO"),
    (108, LllVar, 999, "Reserved ISO"),
    (109, LllVar, 999, "Reserved ISO"),
    (110, LllVar, 999, "Reserved ISO"),
    (111, LllVar, 999, "Reserved ISO"),
    (112, LllVar, 999, "Reserved National"),
    (113, LllVar, 999, "Reserved National"),
    (114, LllVar, 999, "Reserved National"),
    (115, LllVar, 999, "Reserved National"),
    (116, LllVar, 999, "Reserved National"),
    (117, LllVar, 999, "Reserved National"),
    (118, LllVar, 999, "Reserved National"),
    (119, LllVar, 999, "Reserved National"),
    (120, LllVar, 999, "Reserved Private"),
    (121, LllVar, 999, "Reserved Private"),
    (122, LllVar, 999, "Reserved Private"),
    (123, LllVar, 999, "Reserved Private"),
    (124, LllVar, 999, "Reserved Private"),
    (125, LllVar, 999, "Reserved Private"),
    (126, LllVar, 999, "Reserved Private"),
    (127, LllVar, 999, "Reserved Private"),
    (128, Binary, 8, "Message Authentication Code"),
];

/// Ready-made dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownSchema {
    /// ISO 8583:1987, character codec.
    Iso87Ascii,
    /// ISO 8583:1987, binary codec.
    Iso87Binary,
    /// Version 1 message types with the 1987 element table, character codec.
    Iso93Ascii,
    /// Version 1 message types with the 1987 element table, binary codec.
    Iso93Binary,
}

impl KnownSchema {
    /// Builds the protocol schema for this dialect.
    ///
    /// Every known dialect uses the ISO bitmap layout, a 4-digit length
    /// prefix, and keys network management traffic on fields 7 and 11.
    ///
    /// # Errors
    /// Propagates `ValidationError` from the schema builder.
    pub fn schema(self) -> Result<ProtocolSchema, ValidationError> {
        let (codec, version) = match self {
            Self::Iso87Ascii => (MessageCodec::Ascii, '0'),
            Self::Iso87Binary => (MessageCodec::Binary, '0'),
            Self::Iso93Ascii => (MessageCodec::Ascii, '1'),
            Self::Iso93Binary => (MessageCodec::Binary, '1'),
        };
        let length_digits = match codec {
            MessageCodec::Ascii => 4,
            MessageCodec::Binary => 2,
        };
        ProtocolSchema::builder()
            .codec(codec)
            .length_digits(length_digits)
            .bitmap_layout(BitmapLayout::Iso)
            .message(format!("{version}***"), iso87_elements())
            .key_fields(format!("{version}8**"), &[7, 11])
            .build()
    }
}

fn iso87_elements() -> MessageSchemaBuilder {
    ISO87_FIELDS.iter().fold(
        MessageSchema::builder().with_name("ISO 8583:1987"),
        |builder, (position, value_type, length, name)| {
            builder.field(
                *position,
                FieldSchema::primitive(*value_type, *length).with_name(*name),
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_schemas_build() {
        for known in [
            KnownSchema::Iso87Ascii,
            KnownSchema::Iso87Binary,
            KnownSchema::Iso93Ascii,
            KnownSchema::Iso93Binary,
        ] {
            let schema = known.schema().unwrap();
            assert_eq!(schema.bitmap_layout(), BitmapLayout::Iso);
        }
    }

    #[test]
    fn test_iso87_element_table() {
        let schema = KnownSchema::Iso87Ascii.schema().unwrap();
        let message = schema.message_schema("0200").unwrap();
        assert_eq!(message.highest_position(), Some(128));
        assert_eq!(message.fields().count(), 127);

        let stan = message.field(11).unwrap().unwrap();
        assert_eq!(stan.value_type(), ValueType::Numeric);
        assert_eq!(stan.length(), 6);
        assert_eq!(stan.name(), Some("Systems Trace Audit Number"));

        assert!(schema.message_schema("1200").is_none());
    }

    #[test]
    fn test_iso93_uses_version_one() {
        let schema = KnownSchema::Iso93Binary.schema().unwrap();
        assert!(schema.message_schema("1804").is_some());
        assert!(schema.message_schema("0800").is_none());
        assert_eq!(schema.codec(), MessageCodec::Binary);
        assert_eq!(schema.length_digits(), 2);
    }

    #[test]
    fn test_network_key_fields() {
        let schema = KnownSchema::Iso87Ascii.schema().unwrap();
        let echo = "0810".parse().unwrap();
        assert_eq!(schema.key_fields_for(&echo), &[7, 11]);
    }
}

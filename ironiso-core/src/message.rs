/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! ISO 8583 message model.
//!
//! An [`IsoMessage`] owns its type indicator, an optional header, data fields
//! at positions 2 through 128 and an optional trailer byte. Positions 0 (type)
//! and 1 (bitmap) are produced by the packager and are not stored here.

use crate::error::{PackError, StateError};
use crate::field::Field;
use crate::mti::MessageType;
use crate::types::Direction;
use bytes::Bytes;
use std::fmt;

/// First data field position.
pub const FIRST_DATA_FIELD: u16 = 2;

/// Highest field position.
pub const MAX_FIELD_POSITION: u16 = 128;

const SLOT_COUNT: usize = MAX_FIELD_POSITION as usize + 1;

/// Protocol-specific header sent ahead of the type indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// Character header, encoded with the protocol charset.
    Text(String),
    /// Raw header bytes.
    Binary(Bytes),
}

/// An ISO 8583 message.
#[derive(Clone, PartialEq, Eq)]
pub struct IsoMessage {
    mti: MessageType,
    header: Option<Header>,
    fields: Vec<Option<Field>>,
    trailer: Option<u8>,
    direction: Direction,
}

impl IsoMessage {
    /// Creates an outbound message with no fields.
    ///
    /// # Arguments
    /// * `mti` - The message type
    #[must_use]
    pub fn new(mti: MessageType) -> Self {
        Self {
            mti,
            header: None,
            fields: vec![None; SLOT_COUNT],
            trailer: None,
            direction: Direction::Outbound,
        }
    }

    /// Sets the direction, builder style.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the header, builder style.
    #[must_use]
    pub fn with_header(mut self, header: Header) -> Self {
        self.header = Some(header);
        self
    }

    /// Sets the trailer byte, builder style.
    #[must_use]
    pub fn with_trailer(mut self, trailer: u8) -> Self {
        self.trailer = Some(trailer);
        self
    }

    /// Sets a data field, builder style.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `2..=128`.
    pub fn with_field(mut self, position: u16, field: Field) -> Result<Self, PackError> {
        self.set_field(position, field)?;
        Ok(self)
    }

    /// Returns the message type.
    #[inline]
    #[must_use]
    pub const fn mti(&self) -> &MessageType {
        &self.mti
    }

    /// Replaces the message type.
    pub fn set_mti(&mut self, mti: MessageType) {
        self.mti = mti;
    }

    /// Returns the header, if any.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Replaces or clears the header.
    pub fn set_header(&mut self, header: Option<Header>) {
        self.header = header;
    }

    /// Returns the trailer byte, if any.
    #[inline]
    #[must_use]
    pub const fn trailer(&self) -> Option<u8> {
        self.trailer
    }

    /// Replaces or clears the trailer byte.
    pub fn set_trailer(&mut self, trailer: Option<u8>) {
        self.trailer = trailer;
    }

    /// Returns whether the message was received or created locally.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    fn slot(position: u16) -> Result<usize, PackError> {
        if !(FIRST_DATA_FIELD..=MAX_FIELD_POSITION).contains(&position) {
            return Err(PackError::PositionOutOfRange {
                position,
                min: FIRST_DATA_FIELD,
                max: MAX_FIELD_POSITION,
            });
        }
        Ok(usize::from(position))
    }

    /// Sets a data field.
    ///
    /// # Arguments
    /// * `position` - Field position in `2..=128`
    /// * `field` - The field value
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `2..=128`.
    pub fn set_field(&mut self, position: u16, field: Field) -> Result<(), PackError> {
        let slot = Self::slot(position)?;
        self.fields[slot] = Some(field);
        Ok(())
    }

    /// Sets a text data field.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `2..=128`.
    pub fn set_text(&mut self, position: u16, value: impl Into<String>) -> Result<(), PackError> {
        self.set_field(position, Field::text(value))
    }

    /// Sets a binary data field.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `2..=128`.
    pub fn set_binary(&mut self, position: u16, value: impl Into<Bytes>) -> Result<(), PackError> {
        self.set_field(position, Field::binary(value))
    }

    /// Removes and returns a data field.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `2..=128`.
    pub fn remove_field(&mut self, position: u16) -> Result<Option<Field>, PackError> {
        let slot = Self::slot(position)?;
        Ok(self.fields[slot].take())
    }

    /// Returns a data field.
    ///
    /// # Errors
    /// Returns `PackError::PositionOutOfRange` outside `2..=128`.
    pub fn field(&self, position: u16) -> Result<Option<&Field>, PackError> {
        let slot = Self::slot(position)?;
        Ok(self.fields[slot].as_ref())
    }

    /// Returns the text of a data field, or `None` if absent, out of range or
    /// not text.
    #[must_use]
    pub fn text(&self, position: u16) -> Option<&str> {
        self.field(position).ok().flatten().and_then(Field::as_text)
    }

    /// Returns true if the data field is present.
    #[must_use]
    pub fn has_field(&self, position: u16) -> bool {
        matches!(self.field(position), Ok(Some(_)))
    }

    /// Returns true if every listed field is present.
    #[must_use]
    pub fn has_every_field(&self, positions: &[u16]) -> bool {
        positions.iter().all(|p| self.has_field(*p))
    }

    /// Returns true if any listed field is present.
    #[must_use]
    pub fn has_any_field(&self, positions: &[u16]) -> bool {
        positions.iter().any(|p| self.has_field(*p))
    }

    /// Iterates present data fields in ascending position order.
    pub fn fields(&self) -> impl Iterator<Item = (u16, &Field)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|f| (i as u16, f)))
    }

    /// Returns the number of present data fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.iter().filter(|s| s.is_some()).count()
    }

    /// Returns true if the message type is not a response.
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.mti.is_request()
    }

    /// Returns true if the message type is a response.
    #[must_use]
    pub fn is_response(&self) -> bool {
        self.mti.is_response()
    }

    /// Flips a request or advice into its response and marks the message
    /// outbound.
    ///
    /// # Errors
    /// Returns `StateError::NoResponseCounterpart` if the function is neither
    /// request nor advice. The message is left unchanged on error.
    pub fn set_response_type(&mut self) -> Result<(), StateError> {
        self.mti.set_response_type()?;
        self.direction = Direction::Outbound;
        Ok(())
    }
}

impl fmt::Debug for IsoMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entry(&"mti", &self.mti.encode().as_str());
        for (position, field) in self.fields() {
            map.entry(&position, &format_args!("{field}"));
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mti::{MessageClass, MessageFunction, MessageOrigin, MessageVersion};

    fn authorization() -> IsoMessage {
        IsoMessage::new(MessageType::new(
            MessageVersion::V1987,
            MessageClass::Authorization,
            MessageFunction::Request,
            MessageOrigin::Acquirer,
        ))
    }

    #[test]
    fn test_field_access() {
        let mut msg = authorization();
        msg.set_text(11, "000001").unwrap();
        msg.set_binary(52, vec![1u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        assert_eq!(msg.text(11), Some("000001"));
        assert!(msg.has_every_field(&[11, 52]));
        assert!(!msg.has_any_field(&[2, 3]));
        assert_eq!(msg.field_count(), 2);
        assert_eq!(msg.fields().map(|(p, _)| p).collect::<Vec<_>>(), vec![11, 52]);
    }

    #[test]
    fn test_reserved_positions_rejected() {
        let mut msg = authorization();
        for position in [0, 1, 129] {
            assert!(matches!(
                msg.set_text(position, "x"),
                Err(PackError::PositionOutOfRange { .. })
            ));
        }
        assert!(!msg.has_field(1));
    }

    #[test]
    fn test_remove_field() {
        let mut msg = authorization().with_field(3, Field::text("000000")).unwrap();
        assert!(msg.remove_field(3).unwrap().is_some());
        assert!(msg.remove_field(3).unwrap().is_none());
    }

    #[test]
    fn test_response_flip_marks_outbound() {
        let mut msg = authorization().with_direction(Direction::Inbound);
        assert!(msg.is_request());
        msg.set_response_type().unwrap();
        assert!(msg.is_response());
        assert_eq!(msg.direction(), Direction::Outbound);
        assert_eq!(msg.mti().to_string(), "0110");
    }

    #[test]
    fn test_response_flip_error_leaves_message() {
        let mut msg = authorization().with_direction(Direction::Inbound);
        msg.set_response_type().unwrap();
        let mut inbound = msg.clone().with_direction(Direction::Inbound);
        assert!(inbound.set_response_type().is_err());
        assert_eq!(inbound.direction(), Direction::Inbound);
        assert_eq!(inbound.mti(), msg.mti());
    }
}

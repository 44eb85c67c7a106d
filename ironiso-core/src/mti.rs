/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message type indicator (MTI).
//!
//! An MTI is four decimal digits: version, class, function and origin. Each
//! digit maps to one of the enumerations in this module. A component that was
//! never set encodes as `0`.

use crate::error::{PackError, StateError};
use arrayvec::ArrayString;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of characters in an encoded MTI.
pub const MTI_LENGTH: usize = 4;

/// ISO 8583 protocol version (first MTI digit).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum MessageVersion {
    /// ISO 8583:1987.
    V1987 = 0,
    /// ISO 8583:1993.
    V1993 = 1,
    /// ISO 8583:2003.
    V2003 = 2,
    /// Reserved by ISO.
    Reserved3 = 3,
    /// Reserved by ISO.
    Reserved4 = 4,
    /// Reserved by ISO.
    Reserved5 = 5,
    /// Reserved by ISO.
    Reserved6 = 6,
    /// Reserved by ISO.
    Reserved7 = 7,
    /// National use.
    National = 8,
    /// Private use.
    Private = 9,
}

/// Message class (second MTI digit).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum MessageClass {
    /// Authorization.
    Authorization = 1,
    /// Financial presentment.
    Financial = 2,
    /// File actions.
    FileActions = 3,
    /// Reversal and chargeback.
    ReversalChargeback = 4,
    /// Reconciliation.
    Reconciliation = 5,
    /// Administrative.
    Administrative = 6,
    /// Fee collection.
    FeeCollection = 7,
    /// Network management (sign-on, echo, key exchange).
    NetworkManagement = 8,
}

/// Message function (third MTI digit).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum MessageFunction {
    /// Request.
    Request = 0,
    /// Response to a request.
    RequestResponse = 1,
    /// Advice.
    Advice = 2,
    /// Response to an advice.
    AdviceResponse = 3,
    /// Notification.
    Notification = 4,
    /// Notification acknowledgement.
    NotificationAck = 5,
    /// Instruction.
    Instruction = 6,
    /// Instruction acknowledgement.
    InstructionAck = 7,
    /// Reserved by ISO.
    Reserved8 = 8,
    /// Reserved by ISO.
    Reserved9 = 9,
}

/// Message origin (fourth MTI digit).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum MessageOrigin {
    /// Acquirer.
    Acquirer = 0,
    /// Acquirer repeat.
    AcquirerRepeat = 1,
    /// Issuer.
    Issuer = 2,
    /// Issuer repeat.
    IssuerRepeat = 3,
    /// Other.
    Other = 4,
    /// Other repeat.
    OtherRepeat = 5,
    /// Reserved by ISO.
    Reserved6 = 6,
    /// Reserved by ISO.
    Reserved7 = 7,
    /// Reserved by ISO.
    Reserved8 = 8,
    /// Reserved by ISO.
    Reserved9 = 9,
}

impl MessageFunction {
    /// Returns the response counterpart of this function.
    ///
    /// # Returns
    /// `Some` for [`Request`](Self::Request) and [`Advice`](Self::Advice),
    /// `None` for every other function.
    #[must_use]
    pub const fn response(self) -> Option<Self> {
        match self {
            Self::Request => Some(Self::RequestResponse),
            Self::Advice => Some(Self::AdviceResponse),
            _ => None,
        }
    }

    /// Returns the request function a response answers.
    #[must_use]
    pub const fn request(self) -> Option<Self> {
        match self {
            Self::RequestResponse => Some(Self::Request),
            Self::AdviceResponse => Some(Self::Advice),
            _ => None,
        }
    }

    /// Returns true if this is one of the two response functions.
    #[inline]
    #[must_use]
    pub const fn is_response(self) -> bool {
        matches!(self, Self::RequestResponse | Self::AdviceResponse)
    }
}

impl fmt::Display for MessageFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn digit_of<T: ToPrimitive>(component: Option<T>) -> u8 {
    component.and_then(|c| c.to_u8()).unwrap_or(0)
}

fn component_at<T: FromPrimitive>(input: &[u8], position: usize) -> Result<T, PackError> {
    let byte = input[position];
    let invalid = PackError::InvalidMessageTypeDigit {
        character: byte as char,
        position,
    };
    if !byte.is_ascii_digit() {
        return Err(invalid);
    }
    T::from_u8(byte - b'0').ok_or(invalid)
}

/// Four-component message type indicator.
///
/// Components are optional so a partially built type can still be encoded;
/// unset components encode as `0`. Decoding always yields a fully set type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MessageType {
    version: Option<MessageVersion>,
    class: Option<MessageClass>,
    function: Option<MessageFunction>,
    origin: Option<MessageOrigin>,
}

impl MessageType {
    /// Creates a fully specified message type.
    ///
    /// # Arguments
    /// * `version` - Protocol version
    /// * `class` - Message class
    /// * `function` - Message function
    /// * `origin` - Message origin
    #[must_use]
    pub const fn new(
        version: MessageVersion,
        class: MessageClass,
        function: MessageFunction,
        origin: MessageOrigin,
    ) -> Self {
        Self {
            version: Some(version),
            class: Some(class),
            function: Some(function),
            origin: Some(origin),
        }
    }

    /// Sets the version.
    #[must_use]
    pub const fn with_version(mut self, version: MessageVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the class.
    #[must_use]
    pub const fn with_class(mut self, class: MessageClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Sets the function.
    #[must_use]
    pub const fn with_function(mut self, function: MessageFunction) -> Self {
        self.function = Some(function);
        self
    }

    /// Sets the origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: MessageOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Returns the version, if set.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> Option<MessageVersion> {
        self.version
    }

    /// Returns the class, if set.
    #[inline]
    #[must_use]
    pub const fn class(&self) -> Option<MessageClass> {
        self.class
    }

    /// Returns the function, if set.
    #[inline]
    #[must_use]
    pub const fn function(&self) -> Option<MessageFunction> {
        self.function
    }

    /// Returns the origin, if set.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Option<MessageOrigin> {
        self.origin
    }

    /// Encodes this type as its 4-digit form.
    #[must_use]
    pub fn encode(&self) -> ArrayString<MTI_LENGTH> {
        let mut out = ArrayString::new();
        for digit in [
            digit_of(self.version),
            digit_of(self.class),
            digit_of(self.function),
            digit_of(self.origin),
        ] {
            out.push(char::from(b'0' + digit));
        }
        out
    }

    /// Decodes a 4-digit message type.
    ///
    /// # Arguments
    /// * `input` - The encoded type, e.g. `"0800"`
    ///
    /// # Errors
    /// Returns `PackError::InvalidMessageTypeLength` if the input is not exactly
    /// four characters, or `PackError::InvalidMessageTypeDigit` naming the first
    /// character with no mapping.
    pub fn decode(input: &str) -> Result<Self, PackError> {
        Self::decode_bytes(input.as_bytes())
    }

    /// Decodes a message type from four ASCII digit bytes.
    ///
    /// # Errors
    /// Same as [`decode`](Self::decode).
    pub fn decode_bytes(input: &[u8]) -> Result<Self, PackError> {
        if input.len() != MTI_LENGTH {
            return Err(PackError::InvalidMessageTypeLength {
                length: input.len(),
            });
        }
        Ok(Self {
            version: Some(component_at(input, 0)?),
            class: Some(component_at(input, 1)?),
            function: Some(component_at(input, 2)?),
            origin: Some(component_at(input, 3)?),
        })
    }

    /// Returns true unless the function is one of the response functions.
    #[must_use]
    pub fn is_request(&self) -> bool {
        !self.is_response()
    }

    /// Returns true if the function is a response function.
    #[must_use]
    pub fn is_response(&self) -> bool {
        self.function.is_some_and(MessageFunction::is_response)
    }

    /// Flips a request or advice into its response counterpart.
    ///
    /// # Errors
    /// Returns `StateError::NoResponseCounterpart` if the function is neither
    /// request nor advice. The type is left unchanged on error.
    pub fn set_response_type(&mut self) -> Result<(), StateError> {
        let current = self.function.unwrap_or(MessageFunction::Request);
        let response = current
            .response()
            .ok_or_else(|| StateError::NoResponseCounterpart {
                function: current.to_string(),
            })?;
        self.function = Some(response);
        Ok(())
    }

    /// Returns the request form of this type.
    ///
    /// Response functions map back to the function they answer; every other
    /// type is returned unchanged.
    #[must_use]
    pub fn request_form(&self) -> Self {
        match self.function.and_then(MessageFunction::request) {
            Some(request) => self.with_function(request),
            None => *self,
        }
    }
}

impl FromStr for MessageType {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn echo_request() -> MessageType {
        MessageType::new(
            MessageVersion::V1987,
            MessageClass::NetworkManagement,
            MessageFunction::Request,
            MessageOrigin::Acquirer,
        )
    }

    #[test]
    fn test_encode_network_request() {
        assert_eq!(echo_request().encode().as_str(), "0800");
    }

    #[test]
    fn test_unset_components_encode_as_zero() {
        let partial = MessageType::default().with_class(MessageClass::Financial);
        assert_eq!(partial.to_string(), "0200");
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        assert_eq!(
            MessageType::decode(""),
            Err(PackError::InvalidMessageTypeLength { length: 0 })
        );
        assert_eq!(
            MessageType::decode("08000"),
            Err(PackError::InvalidMessageTypeLength { length: 5 })
        );
    }

    #[test]
    fn test_decode_names_bad_digit() {
        assert_eq!(
            MessageType::decode("0900"),
            Err(PackError::InvalidMessageTypeDigit {
                character: '9',
                position: 1
            })
        );
        assert_eq!(
            MessageType::decode("08x0"),
            Err(PackError::InvalidMessageTypeDigit {
                character: 'x',
                position: 2
            })
        );
        assert!(MessageType::decode("0000").is_err());
    }

    #[test]
    fn test_response_flip() {
        let mut mti = echo_request();
        mti.set_response_type().unwrap();
        assert_eq!(mti.function(), Some(MessageFunction::RequestResponse));
        assert!(mti.is_response());

        let mut advice = echo_request().with_function(MessageFunction::Advice);
        advice.set_response_type().unwrap();
        assert_eq!(advice.function(), Some(MessageFunction::AdviceResponse));
    }

    #[test]
    fn test_response_flip_rejects_other_functions() {
        for function in [
            MessageFunction::RequestResponse,
            MessageFunction::AdviceResponse,
            MessageFunction::Notification,
            MessageFunction::NotificationAck,
            MessageFunction::Instruction,
            MessageFunction::InstructionAck,
            MessageFunction::Reserved8,
            MessageFunction::Reserved9,
        ] {
            let mut mti = echo_request().with_function(function);
            let err = mti.set_response_type().unwrap_err();
            assert!(matches!(err, StateError::NoResponseCounterpart { .. }));
            assert_eq!(mti.function(), Some(function));
        }
    }

    #[test]
    fn test_request_form() {
        let response: MessageType = "0810".parse().unwrap();
        assert_eq!(response.request_form().to_string(), "0800");
        let notification: MessageType = "0840".parse().unwrap();
        assert_eq!(notification.request_form(), notification);
    }

    proptest! {
        #[test]
        fn test_mti_round_trip(v in 0u8..10, c in 1u8..9, f in 0u8..10, o in 0u8..10) {
            let mti = MessageType::new(
                MessageVersion::from_u8(v).unwrap(),
                MessageClass::from_u8(c).unwrap(),
                MessageFunction::from_u8(f).unwrap(),
                MessageOrigin::from_u8(o).unwrap(),
            );
            prop_assert_eq!(MessageType::decode(&mti.encode()).unwrap(), mti);
        }
    }
}

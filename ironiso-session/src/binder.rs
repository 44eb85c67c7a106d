/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Request/response binding.

use crate::key::MessageKeyGenerator;
use ironiso_core::{IsoMessage, MessageType};
use std::fmt::Debug;
use std::sync::Arc;

/// Decides whether an inbound message answers a pending request.
pub trait MessageBinder: Send + Sync + Debug {
    /// Returns true if `inbound` is the response to a request of type
    /// `request_type` whose correlation key was `request_key`.
    fn is_bind(&self, request_type: &MessageType, request_key: &str, inbound: &IsoMessage) -> bool;

    /// Returns the correlation key of an outbound request.
    fn key_of(&self, request: &IsoMessage) -> String;
}

/// Binder matching on version, class, response function and correlation key.
#[derive(Debug, Clone)]
pub struct DefaultMessageBinder {
    keys: Arc<dyn MessageKeyGenerator>,
}

impl DefaultMessageBinder {
    /// Creates a binder using `keys` to derive correlation keys.
    #[must_use]
    pub fn new(keys: Arc<dyn MessageKeyGenerator>) -> Self {
        Self { keys }
    }

    /// Returns true if `inbound` has the shape of a response to `request_type`.
    #[must_use]
    pub fn answers(request_type: &MessageType, inbound: &MessageType) -> bool {
        let expected = request_type.function().and_then(|f| f.response());
        expected.is_some()
            && inbound.function() == expected
            && inbound.version() == request_type.version()
            && inbound.class() == request_type.class()
    }
}

impl MessageBinder for DefaultMessageBinder {
    fn is_bind(&self, request_type: &MessageType, request_key: &str, inbound: &IsoMessage) -> bool {
        Self::answers(request_type, inbound.mti()) && self.keys.generate(inbound) == request_key
    }

    fn key_of(&self, request: &IsoMessage) -> String {
        self.keys.generate(request)
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronIso Session
//!
//! Request/response correlation for the IronIso engine.
//!
//! This crate provides:
//! - **Correlation keys**: Keys derived from schema-configured field positions
//! - **Binding**: Deciding whether an inbound message answers a request
//! - **Observers**: One pending waiter per request, with an expiry deadline
//! - **Registry**: Atomic claim of each inbound message by at most one waiter
//! - **Trace numbers**: Atomic field 11 allocation
//! - **Configuration**: Session configuration options

pub mod binder;
pub mod config;
pub mod key;
pub mod observable;
pub mod observer;
pub mod sequence;

pub use binder::{DefaultMessageBinder, MessageBinder};
pub use config::{
    DEFAULT_MAX_FRAME_SIZE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SESSION_NAME, MAX_REQUEST_TIMEOUT,
    SessionConfig, SessionConfigBuilder,
};
pub use key::{KEY_SEPARATOR, MessageKeyGenerator, SchemaKeyGenerator};
pub use observable::ObserverRegistry;
pub use observer::{Completion, MessageObserver, ObserverId};
pub use sequence::StanGenerator;

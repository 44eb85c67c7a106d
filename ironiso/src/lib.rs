/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronIso
//!
//! An ISO 8583 codec and request/response correlation engine for Rust.
//!
//! IronIso packs and unpacks ISO 8583 messages from a declarative schema and
//! turns a full-duplex connection into synchronous request/response calls.
//!
//! ## Features
//!
//! - **Schema-driven**: Field layouts are data, not code
//! - **Two wire encodings**: Character and BCD/binary, selectable per field
//! - **Compound fields**: Composite and constructed fields, nested to any depth
//! - **Correlation**: Responses matched to requests by type and key fields
//! - **Async support**: Built on Tokio
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ironiso::prelude::*;
//! use std::sync::Arc;
//!
//! let schema = Arc::new(KnownSchema::Iso87Ascii.schema()?);
//! let (sink, frames) = ChannelSink::channel(64);
//! let client = ClientBuilder::new(schema).name("acquirer").build(sink)?;
//!
//! let mut echo = IsoMessage::new("0800".parse()?);
//! echo.set_text(11, client.next_stan().format().as_str())?;
//! let response = client.send(&echo).await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Message model, message types and error definitions
//! - [`schema`]: Field, message and protocol schemas
//! - [`codec`]: Field and message packagers
//! - [`session`]: Correlation keys, binding and the observer registry
//! - [`transport`]: Stream framing and outbound sinks
//! - [`engine`]: High-level client

pub mod core {
    //! Message model, message types and error definitions.
    pub use ironiso_core::*;
}

pub mod schema {
    //! Field, message and protocol schemas.
    pub use ironiso_schema::*;
}

pub mod codec {
    //! Field and message packagers.
    pub use ironiso_codec::*;
}

pub mod session {
    //! Correlation keys, binding and the observer registry.
    pub use ironiso_session::*;
}

pub mod transport {
    //! Stream framing and outbound sinks.
    pub use ironiso_transport::*;
}

pub mod engine {
    //! High-level client.
    pub use ironiso_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use ironiso_core::{
        Bitmap, Charset, CorrelationError, Direction, Field, FieldValue, Header, IsoError,
        IsoMessage, MessageClass, MessageFunction, MessageOrigin, MessageType, MessageVersion,
        PackError, Result, Stan, StateError, SubFields, ValidationError,
    };

    // Schema
    pub use ironiso_schema::{
        BitmapLayout, BitmapNumbering, FieldSchema, HeaderKind, KnownSchema, MessageCodec,
        MessageSchema, ProtocolSchema, ValueType,
    };

    // Codec
    pub use ironiso_codec::{FieldPackager, FieldPackagerRegistry, MessagePackager};

    // Session
    pub use ironiso_session::{
        DefaultMessageBinder, MessageBinder, MessageKeyGenerator, ObserverRegistry,
        SchemaKeyGenerator, SessionConfig, StanGenerator,
    };

    // Transport
    pub use ironiso_transport::{ChannelSink, FrameSink, IsoFrameCodec, TransportError};

    // Engine
    pub use ironiso_engine::{
        ClientBuilder, IsoClient, ListenerChain, MessageListener, NetworkEchoListener,
        PendingResponse,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_prelude_imports() {
        let mti: MessageType = "0800".parse().unwrap();
        assert_eq!(mti.class(), Some(MessageClass::NetworkManagement));
        assert_eq!(Stan::default().format().as_str(), "000001");
    }

    #[test]
    fn test_empty_network_request_frame() {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .length_digits(4)
            .message("****", MessageSchema::builder())
            .build()
            .unwrap();
        let packager = MessagePackager::with_defaults(Arc::new(schema)).unwrap();

        let request = IsoMessage::new(MessageType::new(
            MessageVersion::V1987,
            MessageClass::NetworkManagement,
            MessageFunction::Request,
            MessageOrigin::Acquirer,
        ));
        let frame = packager.pack(&request).unwrap();
        assert_eq!(&frame[..], b"00040800");

        let back = packager.unpack(&frame).unwrap();
        assert_eq!(back.mti(), request.mti());
        assert_eq!(back.field_count(), 0);
    }

    #[tokio::test]
    async fn test_client_round_trip_over_channel() {
        let schema = Arc::new(KnownSchema::Iso87Ascii.schema().unwrap());
        let (sink, mut frames) = ChannelSink::channel(8);
        let client = Arc::new(
            ClientBuilder::new(Arc::clone(&schema))
                .name("facade")
                .build(sink)
                .unwrap(),
        );

        let mut echo = IsoMessage::new("0800".parse().unwrap());
        echo.set_text(7, "1019123000").unwrap();
        echo.set_text(11, client.next_stan().format().as_str())
            .unwrap();

        let responder = Arc::clone(&client);
        let server = tokio::spawn(async move {
            let frame = frames.recv().await.unwrap();
            let mut reply = responder.packager().unpack(&frame).unwrap();
            reply.set_response_type().unwrap();
            reply.set_text(39, "00").unwrap();
            let bytes = responder.packager().pack(&reply).unwrap();
            responder.handle_frame(&bytes).await.unwrap();
        });

        let response = client.send(&echo).await.unwrap();
        server.await.unwrap();
        assert_eq!(response.mti().encode().as_str(), "0810");
        assert_eq!(response.text(39), Some("00"));
    }
}

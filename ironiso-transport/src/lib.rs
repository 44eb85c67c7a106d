/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronIso Transport
//!
//! Byte-stream plumbing for the IronIso ISO 8583 engine.
//!
//! This crate provides:
//! - **Codec**: Tokio codec splitting a stream into length-prefixed frames
//! - **Sinks**: The outbound `FrameSink` trait and a channel-backed sink
//! - **Writer**: A task body draining queued frames into a socket

pub mod codec;
pub mod error;
pub mod sink;

pub use codec::IsoFrameCodec;
pub use error::TransportError;
pub use sink::{ChannelSink, FrameSink, write_frames};

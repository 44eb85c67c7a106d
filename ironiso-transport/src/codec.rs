/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tokio codec for ISO 8583 message framing.
//!
//! This module splits a byte stream into frames using the length prefix of
//! the protocol schema. A frame is the prefix, the body it counts and the
//! optional trailer byte, exactly as the message packager produces it.

use crate::error::TransportError;
use bytes::{BufMut, Bytes, BytesMut};
use ironiso_codec::LengthPrefix;
use ironiso_schema::ProtocolSchema;
use ironiso_session::DEFAULT_MAX_FRAME_SIZE;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// Tokio codec for length-prefixed ISO 8583 frames.
#[derive(Debug, Clone)]
pub struct IsoFrameCodec {
    /// Length prefix convention.
    prefix: LengthPrefix,
    /// Whether a trailer byte follows the body.
    trailer: bool,
    /// Maximum frame size in bytes.
    max_frame_size: usize,
}

impl IsoFrameCodec {
    /// Creates a codec for the given prefix and trailer convention.
    #[must_use]
    pub const fn new(prefix: LengthPrefix, trailer: bool) -> Self {
        Self {
            prefix,
            trailer,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Creates a codec matching a protocol schema.
    #[must_use]
    pub fn from_schema(schema: &ProtocolSchema) -> Self {
        Self::new(LengthPrefix::from_schema(schema), schema.has_trailer())
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Returns the maximum frame size.
    #[must_use]
    pub const fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn frame_len(&self, body: usize) -> usize {
        self.prefix.width() + body + usize::from(self.trailer)
    }
}

impl Decoder for IsoFrameCodec {
    type Item = Bytes;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(body) = self.prefix.peek(src)? else {
            return Ok(None);
        };

        let total = self.frame_len(body);
        if total > self.max_frame_size {
            return Err(TransportError::FrameTooLarge {
                size: total,
                max_size: self.max_frame_size,
            });
        }

        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        trace!("Decoded frame of {} bytes", total);
        Ok(Some(src.split_to(total).freeze()))
    }
}

impl Encoder<Bytes> for IsoFrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&[u8]>::encode(self, &item[..], dst)
    }
}

impl Encoder<&[u8]> for IsoFrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_size {
            return Err(TransportError::FrameTooLarge {
                size: item.len(),
                max_size: self.max_frame_size,
            });
        }
        dst.reserve(item.len());
        dst.put_slice(item);
        Ok(())
    }
}

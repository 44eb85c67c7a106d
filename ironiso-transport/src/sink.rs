/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Outbound frame sinks.
//!
//! The client hands every packed frame to a [`FrameSink`]. [`ChannelSink`]
//! queues frames on a tokio channel drained by [`write_frames`], which owns
//! the write half of the connection.

use crate::codec::IsoFrameCodec;
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::SinkExt;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio_util::codec::FramedWrite;
use tracing::{debug, trace};

/// Accepts outbound frames.
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Hands one complete frame to the transport.
    ///
    /// # Errors
    /// Returns `TransportError` if the frame cannot be accepted.
    async fn send_frame(&self, frame: Bytes) -> Result<(), TransportError>;
}

/// Frame sink backed by a bounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    /// Wraps an existing sender.
    #[must_use]
    pub const fn new(sender: mpsc::Sender<Bytes>) -> Self {
        Self { sender }
    }

    /// Creates a sink and the receiver it feeds.
    ///
    /// # Arguments
    /// * `capacity` - Number of frames queued before `send_frame` waits
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }

    /// Returns true if the receiver has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send_frame(&self, frame: Bytes) -> Result<(), TransportError> {
        trace!("Queueing frame of {} bytes", frame.len());
        self.sender
            .send(frame)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

/// Drains queued frames into a writer until the channel closes.
///
/// # Errors
/// Returns the first write error.
pub async fn write_frames<W>(
    mut frames: mpsc::Receiver<Bytes>,
    writer: W,
    codec: IsoFrameCodec,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let mut framed = FramedWrite::new(writer, codec);
    while let Some(frame) = frames.recv().await {
        framed.send(frame).await?;
    }
    debug!("Frame channel closed, writer stopping");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironiso_codec::LengthPrefix;
    use ironiso_schema::MessageCodec;

    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (sink, mut receiver) = ChannelSink::channel(4);
        sink.send_frame(Bytes::from_static(b"00040800"))
            .await
            .unwrap();
        assert_eq!(receiver.recv().await.unwrap(), Bytes::from_static(b"00040800"));
    }

    #[tokio::test]
    async fn test_channel_sink_closed() {
        let (sink, receiver) = ChannelSink::channel(1);
        drop(receiver);
        assert!(sink.is_closed());
        assert_eq!(
            sink.send_frame(Bytes::from_static(b"00040800")).await,
            Err(TransportError::Closed)
        );
    }

    #[tokio::test]
    async fn test_write_frames() {
        let (sink, receiver) = ChannelSink::channel(4);
        let codec = IsoFrameCodec::new(LengthPrefix::new(MessageCodec::Ascii, 4), false);
        let mut out = Vec::new();

        sink.send_frame(Bytes::from_static(b"00040800"))
            .await
            .unwrap();
        sink.send_frame(Bytes::from_static(b"00040810"))
            .await
            .unwrap();
        drop(sink);

        write_frames(receiver, &mut out, codec).await.unwrap();
        assert_eq!(out, b"0004080000040810");
    }
}

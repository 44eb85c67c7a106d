/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! ISO 8583 client.
//!
//! The client packs outbound messages onto a [`FrameSink`] and turns the
//! asynchronous inbound stream back into request/response calls. Each
//! correlated send registers an observer before its bytes leave, then waits
//! on the observer's completion slot. Inbound frames are offered to the
//! pending observers first and to the listener chain otherwise.

use crate::listener::ListenerChain;
use futures::StreamExt;
use ironiso_codec::MessagePackager;
use ironiso_core::{CorrelationError, IsoMessage, Result, Stan};
use ironiso_session::{
    Completion, MAX_REQUEST_TIMEOUT, ObserverId, ObserverRegistry, SessionConfig, StanGenerator,
};
use ironiso_transport::{FrameSink, IsoFrameCodec, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::sync::oneshot;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

/// Deferred response of a correlated send.
///
/// Dropping it abandons the request; a later response then goes to the
/// listener chain.
#[derive(Debug)]
pub struct PendingResponse {
    id: ObserverId,
    timeout: Duration,
    receiver: oneshot::Receiver<Completion>,
    registry: Arc<ObserverRegistry>,
}

impl PendingResponse {
    /// Returns the observer identifier.
    #[must_use]
    pub const fn id(&self) -> ObserverId {
        self.id
    }

    /// Waits for the response.
    ///
    /// # Errors
    /// Returns `CorrelationError::Timeout` if no response arrives in time, or
    /// `CorrelationError::Closed` if the request was dropped from the registry.
    pub async fn wait(mut self) -> std::result::Result<IsoMessage, CorrelationError> {
        match tokio::time::timeout(self.timeout, &mut self.receiver).await {
            Ok(Ok(completion)) => completion,
            Ok(Err(_)) => Err(CorrelationError::Closed),
            Err(_) => {
                // A response may have landed between the timer and the expiry.
                self.registry.expire(self.id);
                self.receiver.try_recv().unwrap_or_else(|_| {
                    Err(CorrelationError::Timeout {
                        elapsed_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    })
                })
            }
        }
    }
}

/// ISO 8583 client over one connection.
#[derive(Debug)]
pub struct IsoClient<S: FrameSink> {
    config: SessionConfig,
    packager: Arc<MessagePackager>,
    registry: Arc<ObserverRegistry>,
    listeners: Arc<ListenerChain>,
    stan: StanGenerator,
    sink: S,
}

impl<S: FrameSink> IsoClient<S> {
    /// Creates a client. Prefer [`ClientBuilder`](crate::ClientBuilder).
    #[must_use]
    pub fn new(
        config: SessionConfig,
        packager: Arc<MessagePackager>,
        registry: Arc<ObserverRegistry>,
        listeners: Arc<ListenerChain>,
        sink: S,
    ) -> Self {
        Self {
            config,
            packager,
            registry,
            listeners,
            stan: StanGenerator::new(),
            sink,
        }
    }

    /// Returns the client name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the message packager.
    #[must_use]
    pub fn packager(&self) -> &Arc<MessagePackager> {
        &self.packager
    }

    /// Returns the observer registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ObserverRegistry> {
        &self.registry
    }

    /// Returns the listener chain.
    #[must_use]
    pub fn listeners(&self) -> &Arc<ListenerChain> {
        &self.listeners
    }

    /// Returns the frame sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Allocates the next trace number for field 11.
    pub fn next_stan(&self) -> Stan {
        self.stan.allocate()
    }

    /// Sends a message without waiting for any response.
    ///
    /// # Errors
    /// Returns a packaging error, or `CorrelationError::Transport` if the
    /// sink rejects the frame.
    pub async fn send_async(&self, message: &IsoMessage) -> Result<()> {
        let frame = self.packager.pack(message)?;
        debug!("[{}] Sending {} ({} bytes)", self.name(), message.mti(), frame.len());
        self.sink.send_frame(frame).await.map_err(transport_error)?;
        Ok(())
    }

    /// Sends a request and returns a handle to its response, waiting at most
    /// the configured request timeout.
    ///
    /// # Errors
    /// Same as [`send_async`](Self::send_async).
    pub async fn send_future(&self, message: &IsoMessage) -> Result<PendingResponse> {
        self.send_future_with_timeout(message, self.config.request_timeout)
            .await
    }

    /// Sends a request and returns a handle to its response.
    ///
    /// The observer is registered before the frame reaches the sink and
    /// removed again if the sink rejects it. `timeout` is capped at
    /// [`MAX_REQUEST_TIMEOUT`].
    ///
    /// # Errors
    /// Same as [`send_async`](Self::send_async).
    pub async fn send_future_with_timeout(
        &self,
        message: &IsoMessage,
        timeout: Duration,
    ) -> Result<PendingResponse> {
        let frame = self.packager.pack(message)?;
        let timeout = timeout.min(MAX_REQUEST_TIMEOUT);
        let (id, receiver) = self.registry.register(message, timeout);
        debug!(
            "[{}] Sending {} as observer {} ({} bytes)",
            self.name(),
            message.mti(),
            id,
            frame.len()
        );

        if let Err(err) = self.sink.send_frame(frame).await {
            self.registry.cancel(id);
            return Err(transport_error(err).into());
        }

        Ok(PendingResponse {
            id,
            timeout,
            receiver,
            registry: Arc::clone(&self.registry),
        })
    }

    /// Sends a request and waits for its response up to the configured
    /// request timeout.
    ///
    /// # Errors
    /// Returns a packaging or transport error, or `CorrelationError::Timeout`.
    pub async fn send(&self, message: &IsoMessage) -> Result<IsoMessage> {
        self.send_with_timeout(message, self.config.request_timeout)
            .await
    }

    /// Sends a request and waits for its response up to `timeout`.
    ///
    /// # Errors
    /// Returns a packaging or transport error, or `CorrelationError::Timeout`.
    pub async fn send_with_timeout(
        &self,
        message: &IsoMessage,
        timeout: Duration,
    ) -> Result<IsoMessage> {
        let pending = self.send_future_with_timeout(message, timeout).await?;
        let id = pending.id();
        match pending.wait().await {
            Ok(response) => Ok(response),
            Err(err) => {
                debug!("[{}] Observer {} finished without response: {}", self.name(), id, err);
                Err(err.into())
            }
        }
    }

    /// Handles one inbound frame.
    ///
    /// # Errors
    /// Returns the packaging error of a malformed frame, or a transport error
    /// from sending a listener reply.
    pub async fn handle_frame(&self, frame: &[u8]) -> Result<()> {
        let message = match self.packager.unpack(frame) {
            Ok(message) => message,
            Err(err) => {
                warn!("[{}] Dropping malformed frame: {}", self.name(), err);
                return Err(err.into());
            }
        };
        self.handle_message(message).await
    }

    /// Handles one inbound message.
    ///
    /// # Errors
    /// Returns a packaging or transport error from sending a listener reply.
    pub async fn handle_message(&self, message: IsoMessage) -> Result<()> {
        let Some(unclaimed) = self.registry.claim(message) else {
            return Ok(());
        };
        debug!("[{}] Unsolicited {}", self.name(), unclaimed.mti());
        for reply in self.listeners.dispatch(&unclaimed).await {
            if let Err(err) = self.send_async(&reply).await {
                warn!("[{}] Failed to send reply {}: {}", self.name(), reply.mti(), err);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Reads frames from `reader` until it closes, handling each in order.
    ///
    /// Malformed frames and listener replies that fail to pack are logged and
    /// skipped.
    ///
    /// # Errors
    /// Returns the first framing or I/O error.
    pub async fn run_reader<R>(&self, reader: R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let codec = IsoFrameCodec::from_schema(self.packager.schema())
            .with_max_frame_size(self.config.max_frame_size);
        let mut frames = FramedRead::new(reader, codec);
        while let Some(frame) = frames.next().await {
            let frame = frame.map_err(transport_error)?;
            if let Err(err) = self.handle_frame(&frame).await
                && !matches!(err, ironiso_core::IsoError::Pack(_))
            {
                return Err(err);
            }
        }
        info!("[{}] Connection closed", self.name());
        Ok(())
    }
}

fn transport_error(err: TransportError) -> CorrelationError {
    CorrelationError::Transport(err.to_string())
}

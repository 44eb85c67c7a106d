/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Inbound message listeners.
//!
//! Messages no pending request claims are handed to the listener chain. Every
//! applicable listener sees the message, lowest order first, and may return a
//! reply for the client to send back.

use async_trait::async_trait;
use ironiso_core::{IsoMessage, MessageClass};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Callback interface for unsolicited inbound messages.
#[async_trait]
pub trait MessageListener: Send + Sync {
    /// Returns the listener name used for removal and logging.
    fn name(&self) -> &str;

    /// Returns the position in the chain. Lower runs first.
    fn order(&self) -> i32 {
        0
    }

    /// Returns true if this listener handles `message`.
    ///
    /// # Arguments
    /// * `message` - The inbound message
    fn is_applicable(&self, message: &IsoMessage) -> bool;

    /// Handles an inbound message.
    ///
    /// # Arguments
    /// * `message` - The inbound message
    ///
    /// # Returns
    /// A reply to send back, if any.
    async fn on_message(&self, message: &IsoMessage) -> Option<IsoMessage>;
}

/// Ordered set of listeners.
#[derive(Default)]
pub struct ListenerChain {
    listeners: RwLock<Vec<Arc<dyn MessageListener>>>,
}

impl ListenerChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener after every listener of lower or equal order.
    pub fn add(&self, listener: Arc<dyn MessageListener>) {
        let mut listeners = self.listeners.write();
        let index = listeners.partition_point(|l| l.order() <= listener.order());
        debug!("Listener {} added at {}", listener.name(), index);
        listeners.insert(index, listener);
    }

    /// Removes every listener named `name`.
    ///
    /// # Returns
    /// `true` if any listener was removed.
    pub fn remove(&self, name: &str) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| l.name() != name);
        listeners.len() != before
    }

    /// Removes every listener.
    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    /// Returns the number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Delivers `message` to every applicable listener in order.
    ///
    /// # Returns
    /// The replies produced, in listener order.
    pub async fn dispatch(&self, message: &IsoMessage) -> Vec<IsoMessage> {
        let applicable: Vec<_> = self
            .listeners
            .read()
            .iter()
            .filter(|l| l.is_applicable(message))
            .cloned()
            .collect();

        if applicable.is_empty() {
            warn!("No listener for unsolicited {}", message.mti());
            return Vec::new();
        }

        let mut replies = Vec::new();
        for listener in applicable {
            debug!("Listener {} handling {}", listener.name(), message.mti());
            if let Some(reply) = listener.on_message(message).await {
                replies.push(reply);
            }
        }
        replies
    }
}

impl std::fmt::Debug for ListenerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .listeners
            .read()
            .iter()
            .map(|l| l.name().to_string())
            .collect();
        f.debug_struct("ListenerChain")
            .field("listeners", &names)
            .finish()
    }
}

/// Answers network management requests with their response type.
///
/// The reply copies every request field, so echo and sign-on requests are
/// acknowledged with the same trace number and terminal.
#[derive(Debug, Default)]
pub struct NetworkEchoListener;

#[async_trait]
impl MessageListener for NetworkEchoListener {
    fn name(&self) -> &str {
        "network-echo"
    }

    fn order(&self) -> i32 {
        i32::MAX
    }

    fn is_applicable(&self, message: &IsoMessage) -> bool {
        message.mti().class() == Some(MessageClass::NetworkManagement) && message.is_request()
    }

    async fn on_message(&self, message: &IsoMessage) -> Option<IsoMessage> {
        let mut reply = message.clone();
        match reply.set_response_type() {
            Ok(()) => Some(reply.with_direction(ironiso_core::Direction::Outbound)),
            Err(err) => {
                debug!("Not answering {}: {}", message.mti(), err);
                None
            }
        }
    }
}

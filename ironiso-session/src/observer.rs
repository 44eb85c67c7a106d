/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Pending-request waiters.
//!
//! An observer holds the correlation data of one outbound request and the
//! sending half of its completion slot. It is created pending and leaves that
//! state exactly once, either matched with a response or expired.

use crate::config::MAX_REQUEST_TIMEOUT;
use ironiso_core::{CorrelationError, IsoMessage, MessageType};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Outcome delivered through a completion slot.
pub type Completion = Result<IsoMessage, CorrelationError>;

/// Identifier of a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A pending request awaiting its response.
#[derive(Debug)]
pub struct MessageObserver {
    id: ObserverId,
    request_type: MessageType,
    key: String,
    timeout: Duration,
    deadline: Instant,
    slot: oneshot::Sender<Completion>,
}

impl MessageObserver {
    /// Creates a pending observer and the receiving half of its slot.
    ///
    /// # Arguments
    /// * `id` - Registry identifier
    /// * `request_type` - Type of the outbound request
    /// * `key` - Correlation key of the outbound request
    /// * `timeout` - How long the observer stays pending, capped at
    ///   [`MAX_REQUEST_TIMEOUT`]
    #[must_use]
    pub fn new(
        id: ObserverId,
        request_type: MessageType,
        key: String,
        timeout: Duration,
    ) -> (Self, oneshot::Receiver<Completion>) {
        let (slot, receiver) = oneshot::channel();
        let timeout = timeout.min(MAX_REQUEST_TIMEOUT);
        let now = Instant::now();
        let observer = Self {
            id,
            request_type,
            key,
            timeout,
            deadline: now.checked_add(timeout).unwrap_or(now),
            slot,
        };
        (observer, receiver)
    }

    /// Returns the identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ObserverId {
        self.id
    }

    /// Returns the request type.
    #[inline]
    #[must_use]
    pub const fn request_type(&self) -> &MessageType {
        &self.request_type
    }

    /// Returns the correlation key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the deadline.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns true if the deadline has passed at `now`.
    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Returns true if nobody is waiting on the slot any more.
    #[inline]
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.slot.is_closed()
    }

    /// Completes the slot with a response.
    ///
    /// # Errors
    /// Returns the message back if the receiving half was dropped.
    pub fn complete(self, message: IsoMessage) -> Result<(), IsoMessage> {
        match self.slot.send(Ok(message)) {
            Err(Ok(message)) => Err(message),
            Ok(()) | Err(Err(_)) => Ok(()),
        }
    }

    /// Fails the slot with a timeout.
    pub fn expire(self) {
        let elapsed_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        self.fail(CorrelationError::Timeout { elapsed_ms });
    }

    /// Fails the slot with `error`. A dropped receiver is ignored.
    pub fn fail(self, error: CorrelationError) {
        let _ = self.slot.send(Err(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer(timeout: Duration) -> (MessageObserver, oneshot::Receiver<Completion>) {
        MessageObserver::new(
            ObserverId::new(1),
            "0800".parse().unwrap(),
            "000001".to_string(),
            timeout,
        )
    }

    #[test]
    fn test_complete_delivers_message() {
        let (observer, mut receiver) = observer(Duration::from_secs(5));
        let response = IsoMessage::new("0810".parse().unwrap());
        observer.complete(response.clone()).unwrap();
        assert_eq!(receiver.try_recv().unwrap(), Ok(response));
    }

    #[test]
    fn test_complete_abandoned_returns_message() {
        let (observer, receiver) = observer(Duration::from_secs(5));
        drop(receiver);
        assert!(observer.is_abandoned());
        let response = IsoMessage::new("0810".parse().unwrap());
        assert_eq!(observer.complete(response.clone()), Err(response));
    }

    #[test]
    fn test_expire_reports_timeout() {
        let (observer, mut receiver) = observer(Duration::from_millis(250));
        assert_eq!(observer.key(), "000001");
        assert!(!observer.is_expired(Instant::now()));
        assert!(observer.is_expired(observer.deadline()));
        observer.expire();
        assert_eq!(
            receiver.try_recv().unwrap(),
            Err(CorrelationError::Timeout { elapsed_ms: 250 })
        );
    }

    #[test]
    fn test_deadline_capped() {
        let before = Instant::now();
        let (observer, _receiver) = observer(Duration::MAX);
        assert!(observer.deadline() >= before + MAX_REQUEST_TIMEOUT);
        assert!(!observer.is_expired(Instant::now()));
    }

    #[test]
    fn test_observer_id_display() {
        assert_eq!(ObserverId::new(42).to_string(), "#42");
    }
}

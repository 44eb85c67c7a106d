/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Observer registry.
//!
//! Holds every pending request of one connection. Each inbound message is
//! offered to the pending observers in registration order and claimed by at
//! most one of them. Every mutation first sweeps out observers whose deadline
//! has passed or whose waiter has gone away.
//!
//! Slots are completed after the registry lock is released, so a woken waiter
//! never contends with the dispatcher that woke it.

use crate::binder::MessageBinder;
use crate::observer::{Completion, MessageObserver, ObserverId};
use ironiso_core::IsoMessage;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::debug;

/// Registry of pending requests.
#[derive(Debug)]
pub struct ObserverRegistry {
    binder: Arc<dyn MessageBinder>,
    observers: Mutex<Vec<MessageObserver>>,
    next_id: AtomicU64,
}

impl ObserverRegistry {
    /// Creates an empty registry matching with `binder`.
    #[must_use]
    pub fn new(binder: Arc<dyn MessageBinder>) -> Self {
        Self {
            binder,
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the binder.
    #[must_use]
    pub fn binder(&self) -> &Arc<dyn MessageBinder> {
        &self.binder
    }

    /// Registers a pending observer for an outbound request.
    ///
    /// Call this before the request's bytes are handed to the transport so a
    /// fast response cannot arrive unobserved.
    ///
    /// # Arguments
    /// * `request` - The outbound request
    /// * `timeout` - How long the observer stays pending
    pub fn register(
        &self,
        request: &IsoMessage,
        timeout: Duration,
    ) -> (ObserverId, oneshot::Receiver<Completion>) {
        let id = ObserverId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let key = self.binder.key_of(request);
        debug!("Observer {} registered for {} key {:?}", id, request.mti(), key);
        let (observer, receiver) = MessageObserver::new(id, *request.mti(), key, timeout);

        let expired = {
            let mut observers = self.observers.lock();
            let expired = sweep(&mut observers, Instant::now());
            observers.push(observer);
            expired
        };
        expire_all(expired);
        (id, receiver)
    }

    /// Offers an inbound message to the pending observers.
    ///
    /// The first observer whose binder accepts the message is removed and
    /// completed with it.
    ///
    /// # Returns
    /// `None` if an observer took the message, otherwise the message back
    /// for the listener path.
    pub fn claim(&self, inbound: IsoMessage) -> Option<IsoMessage> {
        let (matched, expired) = {
            let mut observers = self.observers.lock();
            let expired = sweep(&mut observers, Instant::now());
            let matched = observers
                .iter()
                .position(|o| self.binder.is_bind(o.request_type(), o.key(), &inbound))
                .map(|index| observers.remove(index));
            (matched, expired)
        };
        expire_all(expired);

        let Some(observer) = matched else {
            return Some(inbound);
        };
        let id = observer.id();
        match observer.complete(inbound) {
            Ok(()) => {
                debug!("Observer {} matched", id);
                None
            }
            Err(inbound) => {
                debug!("Observer {} matched after its waiter left", id);
                Some(inbound)
            }
        }
    }

    /// Forces an observer out with a timeout.
    ///
    /// # Returns
    /// `true` if the observer was still pending.
    pub fn expire(&self, id: ObserverId) -> bool {
        match self.take(id) {
            Some(observer) => {
                debug!("Observer {} expired", id);
                observer.expire();
                true
            }
            None => false,
        }
    }

    /// Removes an observer without completing it.
    ///
    /// Its waiter sees the slot close.
    ///
    /// # Returns
    /// `true` if the observer was still pending.
    pub fn cancel(&self, id: ObserverId) -> bool {
        let cancelled = self.take(id).is_some();
        if cancelled {
            debug!("Observer {} cancelled", id);
        }
        cancelled
    }

    /// Removes and fails every observer whose deadline has passed.
    ///
    /// # Returns
    /// The number of observers expired.
    pub fn sweep_expired(&self) -> usize {
        let expired = sweep(&mut self.observers.lock(), Instant::now());
        let count = expired.len();
        expire_all(expired);
        count
    }

    /// Returns the number of observers held, including any not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    /// Returns true if no observer is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.lock().is_empty()
    }

    fn take(&self, id: ObserverId) -> Option<MessageObserver> {
        let mut observers = self.observers.lock();
        let index = observers.iter().position(|o| o.id() == id)?;
        Some(observers.remove(index))
    }
}

/// Removes stale observers, keeping the rest in registration order.
///
/// Returns the expired ones that still have a waiter to notify.
fn sweep(observers: &mut Vec<MessageObserver>, now: Instant) -> Vec<MessageObserver> {
    let is_stale = |o: &MessageObserver| o.is_expired(now) || o.is_abandoned();
    if !observers.iter().any(is_stale) {
        return Vec::new();
    }
    let (stale, live): (Vec<_>, Vec<_>) = std::mem::take(observers).into_iter().partition(is_stale);
    *observers = live;
    stale.into_iter().filter(|o| !o.is_abandoned()).collect()
}

fn expire_all(expired: Vec<MessageObserver>) {
    for observer in expired {
        debug!("Observer {} expired", observer.id());
        observer.expire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::DefaultMessageBinder;
    use crate::config::MAX_REQUEST_TIMEOUT;
    use crate::key::SchemaKeyGenerator;
    use ironiso_core::CorrelationError;
    use ironiso_schema::{MessageCodec, MessageSchema, ProtocolSchema};

    fn registry() -> ObserverRegistry {
        let schema = ProtocolSchema::builder()
            .codec(MessageCodec::Ascii)
            .message("****", MessageSchema::builder())
            .build()
            .unwrap();
        let keys = SchemaKeyGenerator::new(Arc::new(schema));
        ObserverRegistry::new(Arc::new(DefaultMessageBinder::new(Arc::new(keys))))
    }

    fn message(mti: &str, stan: &str) -> IsoMessage {
        let mut msg = IsoMessage::new(mti.parse().unwrap());
        msg.set_text(11, stan).unwrap();
        msg
    }

    const LONG: Duration = Duration::from_secs(30);

    #[test]
    fn test_claim_completes_only_matching_observer() {
        let registry = registry();
        let (_, mut first) = registry.register(&message("0800", "000001"), LONG);
        let (_, mut second) = registry.register(&message("0800", "000002"), LONG);
        assert_eq!(registry.len(), 2);

        let response = message("0810", "000001");
        assert!(registry.claim(response.clone()).is_none());

        assert_eq!(first.try_recv().unwrap(), Ok(response));
        assert!(second.try_recv().is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_message_claimed_once() {
        let registry = registry();
        let (_, mut first) = registry.register(&message("0800", "000001"), LONG);
        let (_, mut second) = registry.register(&message("0800", "000001"), LONG);

        assert!(registry.claim(message("0810", "000001")).is_none());
        assert!(first.try_recv().is_ok());
        assert!(second.try_recv().is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unmatched_message_returned() {
        let registry = registry();
        let (_, _receiver) = registry.register(&message("0800", "000001"), LONG);

        let unsolicited = message("0800", "000001");
        assert_eq!(registry.claim(unsolicited.clone()), Some(unsolicited));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_expired_observer_fails_and_late_response_forwarded() {
        let registry = registry();
        let (_, mut receiver) =
            registry.register(&message("0800", "000001"), Duration::from_millis(20));
        std::thread::sleep(Duration::from_millis(40));

        let late = message("0810", "000001");
        assert_eq!(registry.claim(late.clone()), Some(late));
        assert_eq!(
            receiver.try_recv().unwrap(),
            Err(CorrelationError::Timeout { elapsed_ms: 20 })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_with_unbounded_timeout() {
        let registry = registry();
        let (id, mut receiver) = registry.register(&message("0800", "000001"), Duration::MAX);
        assert_eq!(registry.sweep_expired(), 0);

        assert!(registry.expire(id));
        assert_eq!(
            receiver.try_recv().unwrap(),
            Err(CorrelationError::Timeout {
                elapsed_ms: u64::try_from(MAX_REQUEST_TIMEOUT.as_millis()).unwrap()
            })
        );
    }

    #[test]
    fn test_sweep_expired() {
        let registry = registry();
        let (_, _short) = registry.register(&message("0800", "000001"), Duration::from_millis(10));
        let (_, _long) = registry.register(&message("0800", "000002"), LONG);
        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(registry.sweep_expired(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.sweep_expired(), 0);
    }

    #[test]
    fn test_abandoned_observer_skipped() {
        let registry = registry();
        let (_, receiver) = registry.register(&message("0800", "000001"), LONG);
        drop(receiver);

        let response = message("0810", "000001");
        assert_eq!(registry.claim(response.clone()), Some(response));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_expire_and_cancel() {
        let registry = registry();
        let (first, mut expired) = registry.register(&message("0800", "000001"), LONG);
        let (second, mut cancelled) = registry.register(&message("0800", "000002"), LONG);

        assert!(registry.expire(first));
        assert!(!registry.expire(first));
        assert!(matches!(
            expired.try_recv().unwrap(),
            Err(CorrelationError::Timeout { .. })
        ));

        assert!(registry.cancel(second));
        assert!(!registry.cancel(second));
        assert_eq!(
            cancelled.try_recv(),
            Err(oneshot::error::TryRecvError::Closed)
        );
        assert!(registry.is_empty());
    }
}

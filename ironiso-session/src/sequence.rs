/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Trace number allocation.
//!
//! This module provides lock-free allocation of systems trace audit numbers
//! (field 11) for outbound requests.

use ironiso_core::Stan;
use std::sync::atomic::{AtomicU32, Ordering};

/// Hands out trace numbers `1..=999999`, wrapping after the maximum.
///
/// Uses atomic operations for thread-safe access without locks.
#[derive(Debug)]
pub struct StanGenerator {
    /// Next trace number to hand out.
    next: AtomicU32,
}

impl StanGenerator {
    /// Creates a generator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial(Stan::default())
    }

    /// Creates a generator starting at `initial`.
    #[must_use]
    pub fn with_initial(initial: Stan) -> Self {
        Self {
            next: AtomicU32::new(initial.value()),
        }
    }

    /// Returns the next trace number without allocating it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Stan {
        Stan::new(self.next.load(Ordering::SeqCst))
    }

    /// Allocates and returns the next trace number.
    #[inline]
    pub fn allocate(&self) -> Stan {
        let previous = self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |raw| {
                Some(Stan::new(raw).next().value())
            });
        match previous {
            Ok(raw) | Err(raw) => Stan::new(raw),
        }
    }

    /// Restarts allocation at `stan`.
    #[inline]
    pub fn reset_to(&self, stan: Stan) {
        self.next.store(stan.value(), Ordering::SeqCst);
    }
}

impl Default for StanGenerator {
    fn default() -> Self {
        Self::new()
    }
}

//! Per-booking mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use seatdesk_core::types::BookingId;

type LockMap = DashMap<BookingId, Arc<Mutex<()>>>;

/// Registry of one async mutex per booking id.
///
/// Approval, order creation, verification, and provisioning for the same
/// booking are serialized through it; different bookings never contend.
/// An entry lives only while some task holds or waits on it. The lock is
/// not reentrant.
#[derive(Debug, Clone, Default)]
pub struct BookingLocks {
    locks: Arc<LockMap>,
}

/// Holds a booking's lock until dropped.
#[derive(Debug)]
pub struct BookingGuard {
    guard: Option<OwnedMutexGuard<()>>,
    booking_id: BookingId,
    locks: Arc<LockMap>,
}

impl BookingLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the lock for `booking_id`.
    pub async fn acquire(&self, booking_id: BookingId) -> BookingGuard {
        let mutex = self
            .locks
            .entry(booking_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        BookingGuard {
            guard: Some(mutex.lock_owned().await),
            booking_id,
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of tracked bookings.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no bookings are tracked.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for BookingGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The map's own reference is the last one once nobody waits.
        self.locks
            .remove_if(&self.booking_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

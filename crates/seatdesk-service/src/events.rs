//! In-process domain event bus.

use tokio::sync::broadcast;
use tracing::trace;

use seatdesk_core::events::{DomainEvent, EventPayload};
use seatdesk_core::traits::Clock;

/// Fan-out of domain events to any number of subscribers.
///
/// Publishing never blocks; a subscriber that falls behind by more than
/// the buffer size sees `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event stamped with the clock's current time.
    pub fn publish(&self, clock: &dyn Clock, payload: impl Into<EventPayload>) {
        let event = DomainEvent::new(clock.now(), payload.into());
        let receivers = self.tx.send(event).unwrap_or(0);
        trace!(receivers, "Published domain event");
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

//! Domain events emitted by SeatDesk operations.
//!
//! Events are published on the service layer's event bus after the state
//! change they describe has been persisted. Consumers (audit, realtime
//! fan-out, metrics) subscribe and must tolerate lag.

pub mod booking;
pub mod payment;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use booking::BookingEvent;
pub use payment::PaymentEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A booking lifecycle event.
    Booking(BookingEvent),
    /// A payment event.
    Payment(PaymentEvent),
}

impl DomainEvent {
    /// Create a new domain event stamped at `timestamp`.
    pub fn new(timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            payload,
        }
    }
}

impl From<BookingEvent> for EventPayload {
    fn from(event: BookingEvent) -> Self {
        Self::Booking(event)
    }
}

impl From<PaymentEvent> for EventPayload {
    fn from(event: PaymentEvent) -> Self {
        Self::Payment(event)
    }
}

//! Booking lifecycle events.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, BookingId, LibraryId, OrderId, SubscriptionId};

/// Events emitted when a booking changes state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BookingEvent {
    /// A booking request was accepted for review.
    Submitted {
        /// The booking ID.
        booking_id: BookingId,
        /// The library requested.
        library_id: LibraryId,
    },
    /// An admin approved the booking and a payment order was issued.
    Approved {
        /// The booking ID.
        booking_id: BookingId,
        /// The order the requester must pay.
        order_id: OrderId,
    },
    /// An admin rejected the booking.
    Rejected {
        /// The booking ID.
        booking_id: BookingId,
        /// Reason given by the admin.
        reason: String,
    },
    /// The booking was cancelled before activation.
    Cancelled {
        /// The booking ID.
        booking_id: BookingId,
    },
    /// Account and subscription were provisioned; the booking is active.
    Activated {
        /// The booking ID.
        booking_id: BookingId,
        /// The customer account created for it.
        account_id: AccountId,
        /// The subscription activated for it.
        subscription_id: SubscriptionId,
    },
    /// The subscription lapsed.
    Expired {
        /// The booking ID.
        booking_id: BookingId,
    },
}

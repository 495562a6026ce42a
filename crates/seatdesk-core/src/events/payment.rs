//! Payment verification events.

use serde::{Deserialize, Serialize};

use crate::types::{BookingId, OrderId};

/// Events emitted by the payment verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PaymentEvent {
    /// A payment order was created for a booking.
    OrderCreated {
        /// The order ID.
        order_id: OrderId,
        /// The booking being paid for.
        booking_id: BookingId,
        /// Amount in minor currency units.
        amount: i64,
        /// ISO currency code.
        currency: String,
    },
    /// A payment callback was authenticated and matched the order.
    /// Consumed by provisioning.
    Verified {
        /// The order ID.
        order_id: OrderId,
        /// The booking that was paid for.
        booking_id: BookingId,
        /// The provider's payment ID.
        external_payment_id: String,
    },
    /// A payment callback was rejected.
    Failed {
        /// The order ID.
        order_id: OrderId,
        /// The booking being paid for.
        booking_id: BookingId,
        /// Why verification failed.
        reason: String,
    },
}

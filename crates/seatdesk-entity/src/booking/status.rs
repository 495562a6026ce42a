//! Booking status, actions, and the transition table.
//!
//! Every legal move of the booking state machine is one row in
//! [`TRANSITIONS`]. Services never compare statuses by hand; they ask
//! [`BookingStatus::apply`] and persist the answer.

use serde::{Deserialize, Serialize};
use std::fmt;

use seatdesk_core::AppError;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Submitted, awaiting admin review.
    Pending,
    /// Approved by an admin; a payment order is about to be issued.
    Approved,
    /// Rejected by an admin.
    Rejected,
    /// Waiting for the requester to pay.
    PaymentPending,
    /// Paid and provisioned.
    Active,
    /// The subscription lapsed.
    Expired,
    /// Cancelled before activation.
    Cancelled,
}

/// Something that can happen to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    /// Admin approval.
    Approve,
    /// Payment order issued after approval.
    RequestPayment,
    /// Admin rejection.
    Reject,
    /// Cancellation by the requester or an admin.
    Cancel,
    /// A payment callback was verified and the booking provisioned.
    PaymentVerified,
    /// A payment callback failed verification.
    PaymentFailed,
    /// The subscription lapsed.
    Expire,
}

/// `(from, action, to)` rows. Anything absent is an illegal move.
pub const TRANSITIONS: &[(BookingStatus, BookingAction, BookingStatus)] = &[
    (BookingStatus::Pending, BookingAction::Approve, BookingStatus::Approved),
    (BookingStatus::Pending, BookingAction::Reject, BookingStatus::Rejected),
    (BookingStatus::Pending, BookingAction::Cancel, BookingStatus::Cancelled),
    (BookingStatus::Approved, BookingAction::RequestPayment, BookingStatus::PaymentPending),
    (BookingStatus::Approved, BookingAction::Cancel, BookingStatus::Cancelled),
    (BookingStatus::PaymentPending, BookingAction::PaymentVerified, BookingStatus::Active),
    (BookingStatus::PaymentPending, BookingAction::PaymentFailed, BookingStatus::PaymentPending),
    (BookingStatus::PaymentPending, BookingAction::Cancel, BookingStatus::Cancelled),
    (BookingStatus::Active, BookingAction::Expire, BookingStatus::Expired),
];

impl BookingStatus {
    /// Look up the status reached by applying `action`.
    pub fn apply(self, action: BookingAction) -> Result<Self, AppError> {
        TRANSITIONS
            .iter()
            .find(|(from, on, _)| *from == self && *on == action)
            .map(|(_, _, to)| *to)
            .ok_or_else(|| {
                AppError::invalid_transition(format!(
                    "Cannot {action} a booking that is {self}"
                ))
            })
    }

    /// Whether `action` is legal from this status.
    pub fn allows(self, action: BookingAction) -> bool {
        self.apply(action).is_ok()
    }

    /// Whether the booking holds a seat (counts against capacity).
    pub fn occupies_seat(&self) -> bool {
        matches!(self, Self::Approved | Self::PaymentPending | Self::Active)
    }

    /// Whether the booking state machine is finished with this booking.
    /// An active booking can still lapse through the subscription lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Expired | Self::Cancelled | Self::Active
        )
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::PaymentPending => "payment_pending",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BookingAction {
    /// Return the action as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::RequestPayment => "request_payment",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::PaymentVerified => "payment_verified",
            Self::PaymentFailed => "payment_failed",
            Self::Expire => "expire",
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

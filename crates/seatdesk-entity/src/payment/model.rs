//! Payment order entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use seatdesk_core::types::{BookingId, OrderId};

/// Verification status of a payment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Issued, awaiting a callback.
    Created,
    /// A callback was authenticated and matched the order.
    Verified,
    /// A callback was rejected. A new order may be issued.
    Failed,
}

impl PaymentStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Verified => "verified",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment order issued for a booking. Rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    /// External order identifier.
    pub order_id: OrderId,
    /// The booking being paid for.
    pub booking_id: BookingId,
    /// Expected amount in minor currency units.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// Receipt reference shown to the provider (`booking_<id>`).
    pub receipt: String,
    /// Free-form order notes forwarded to the provider.
    pub notes: serde_json::Value,
    /// Verification status.
    pub status: PaymentStatus,
    /// The provider's payment id from the callback.
    pub external_payment_id: Option<String>,
    /// The signature supplied with the callback.
    pub signature: Option<String>,
    /// Why verification failed.
    pub failure_reason: Option<String>,
    /// When the order was issued.
    pub created_at: DateTime<Utc>,
    /// When verification succeeded.
    pub verified_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Receipt reference for a booking.
    pub fn receipt_for(booking_id: BookingId) -> String {
        format!("booking_{booking_id}")
    }

    /// Whether the order is still awaiting a callback.
    pub fn is_open(&self) -> bool {
        self.status == PaymentStatus::Created
    }
}

//! Booking entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seatdesk_core::types::{BookingId, ContactInfo, LibraryId};

use super::request::BookingRequest;
use super::status::BookingStatus;

/// A seat booking tracked from request to activation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// Requester's full name.
    pub requester_name: String,
    /// Requester's email.
    pub requester_email: String,
    /// Requester's mobile number.
    pub requester_mobile: String,
    /// Requester's postal address.
    pub requester_address: Option<String>,
    /// The library the seat belongs to.
    pub library_id: LibraryId,
    /// The specific seat, if one was requested.
    pub seat_id: Option<String>,
    /// Start of the booked window.
    pub window_start: DateTime<Utc>,
    /// End of the booked window.
    pub window_end: DateTime<Utc>,
    /// Subscription length in months.
    pub subscription_months: i32,
    /// Amount due in minor currency units.
    pub amount_due: i64,
    /// ISO currency code.
    pub currency: String,
    /// Free-text purpose.
    pub purpose: Option<String>,
    /// Current lifecycle status.
    pub status: BookingStatus,
    /// Reason given when rejected.
    pub rejection_reason: Option<String>,
    /// Number of failed payment verifications so far.
    pub failed_verifications: i32,
    /// When the booking was submitted.
    pub created_at: DateTime<Utc>,
    /// When an admin approved it.
    pub approved_at: Option<DateTime<Utc>>,
    /// When payment was verified and the booking activated.
    pub paid_at: Option<DateTime<Utc>>,
    /// When it was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Build a pending booking from a validated request.
    pub fn from_request(
        request: BookingRequest,
        default_currency: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BookingId::new(),
            requester_name: request.contact.name,
            requester_email: request.contact.email,
            requester_mobile: request.contact.mobile,
            requester_address: request.contact.address,
            library_id: request.library_id,
            seat_id: request.seat_id,
            window_start: request.starts_at,
            window_end: request.ends_at,
            subscription_months: request.subscription_months,
            amount_due: request.amount_due,
            currency: request
                .currency
                .unwrap_or_else(|| default_currency.to_string()),
            purpose: request.purpose,
            status: BookingStatus::Pending,
            rejection_reason: None,
            failed_verifications: 0,
            created_at: now,
            approved_at: None,
            paid_at: None,
            cancelled_at: None,
            updated_at: now,
        }
    }

    /// The requester's contact details.
    pub fn contact(&self) -> ContactInfo {
        ContactInfo {
            name: self.requester_name.clone(),
            email: self.requester_email.clone(),
            mobile: self.requester_mobile.clone(),
            address: self.requester_address.clone(),
        }
    }

    /// Whether this booking's window overlaps `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.window_start < end && start < self.window_end
    }
}

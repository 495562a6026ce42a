//! Booking request as submitted by a prospective customer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seatdesk_core::AppError;
use seatdesk_core::types::{ContactInfo, LibraryId};

/// Input to booking submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Who is asking for the seat.
    pub contact: ContactInfo,
    /// Library the seat belongs to.
    pub library_id: LibraryId,
    /// A specific seat, if the requester picked one.
    pub seat_id: Option<String>,
    /// Start of the requested window.
    pub starts_at: DateTime<Utc>,
    /// End of the requested window.
    pub ends_at: DateTime<Utc>,
    /// Subscription length in months.
    pub subscription_months: i32,
    /// Amount due in minor currency units (paise).
    pub amount_due: i64,
    /// ISO currency code; the configured default applies when absent.
    pub currency: Option<String>,
    /// Free-text purpose of the booking.
    pub purpose: Option<String>,
}

impl BookingRequest {
    /// Check the request is well-formed. Availability is checked separately.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.contact.name.trim().is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        if !self.contact.email.contains('@') {
            return Err(AppError::validation(format!(
                "Invalid email address '{}'",
                self.contact.email
            )));
        }
        if self.contact.mobile.trim().is_empty() {
            return Err(AppError::validation("Mobile number is required"));
        }
        if self.amount_due <= 0 {
            return Err(AppError::validation("Amount due must be positive"));
        }
        if self.subscription_months < 1 {
            return Err(AppError::validation(
                "Subscription must be at least one month",
            ));
        }
        if self.ends_at <= self.starts_at {
            return Err(AppError::validation(
                "Requested window must end after it starts",
            ));
        }
        if let Some(currency) = &self.currency {
            if currency.len() != 3 {
                return Err(AppError::validation(format!(
                    "Invalid currency code '{currency}'"
                )));
            }
        }
        if let Some(seat) = &self.seat_id {
            if seat.trim().is_empty() {
                return Err(AppError::validation("Seat id must not be blank"));
            }
        }
        Ok(())
    }
}

//! Requester contact details and subscription plan terms.

use serde::{Deserialize, Serialize};

use super::id::{BookingId, LibraryId};

/// Contact details captured on a booking request and used to create the
/// customer account once payment is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Full name of the requester.
    pub name: String,
    /// Email address of the requester.
    pub email: String,
    /// Mobile number of the requester.
    pub mobile: String,
    /// Postal address, if provided.
    pub address: Option<String>,
}

/// Terms of the subscription activated for a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    /// The booking this subscription originates from.
    pub booking_id: BookingId,
    /// The library the seat belongs to.
    pub library_id: LibraryId,
    /// Length of the subscription in months.
    pub months: u32,
    /// Amount paid in minor currency units.
    pub amount_paid: i64,
    /// ISO currency code.
    pub currency: String,
}

//! Subscription record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seatdesk_core::types::{AccountId, BookingId, LibraryId, RecipientId, SubscriptionId};

/// Lifecycle status of a provisioned subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Within its paid term.
    Active,
    /// Past its end date.
    Expired,
}

/// The outcome of provisioning a booking, keyed by booking id.
///
/// At most one record exists per booking; its presence is the
/// provisioning idempotency guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SubscriptionRecord {
    /// The booking that was provisioned.
    pub booking_id: BookingId,
    /// The customer account created for it.
    pub account_id: AccountId,
    /// The subscription activated for it.
    pub subscription_id: SubscriptionId,
    /// The library the seat belongs to.
    pub library_id: LibraryId,
    /// Length of the term in months.
    pub months: i32,
    /// Start of the term.
    pub starts_at: DateTime<Utc>,
    /// End of the term.
    pub ends_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: SubscriptionStatus,
    /// Last time an expiry warning was enqueued.
    pub last_warned_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// The notification recipient for this subscription's holder.
    pub fn recipient(&self) -> RecipientId {
        self.account_id.into()
    }

    /// Whole days left until the term ends, rounded up. Zero or negative
    /// once the term has ended.
    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        let remaining = self.ends_at - now;
        let days = remaining.num_days();
        if remaining > chrono::Duration::days(days) {
            days + 1
        } else {
            days
        }
    }

    /// Whether an expiry warning was already enqueued on `now`'s date.
    pub fn warned_on_day_of(&self, now: DateTime<Utc>) -> bool {
        self.last_warned_at
            .map(|at| at.date_naive() == now.date_naive())
            .unwrap_or(false)
    }
}

//! Subscription expiry warnings and lapses.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use seatdesk_core::error::ErrorKind;
use seatdesk_core::result::AppResult;
use seatdesk_core::traits::Clock;
use seatdesk_core::types::Priority;
use seatdesk_database::SubscriptionStore;
use seatdesk_entity::subscription::{SubscriptionRecord, SubscriptionStatus};
use seatdesk_service::{BookingService, NotificationService};

const EXPIRED_TITLE: &str = "Subscription Expired";
const EXPIRED_MESSAGE: &str = "Your library subscription has expired. Please renew immediately to restore access to library services.";

/// Counts from one expiry check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpiryReport {
    /// Subscriptions that received an ending-soon warning.
    pub warned: usize,
    /// Subscriptions marked expired.
    pub expired: usize,
    /// Subscriptions that could not be processed; retried next check.
    pub failed: usize,
}

/// Warns subscribers whose term ends soon and expires lapsed terms.
#[derive(Debug, Clone)]
pub struct SubscriptionExpiryCheck {
    subscriptions: Arc<dyn SubscriptionStore>,
    bookings: BookingService,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
    warning_days: u32,
}

impl SubscriptionExpiryCheck {
    /// Create the check.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        bookings: BookingService,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
        warning_days: u32,
    ) -> Self {
        Self {
            subscriptions,
            bookings,
            notifications,
            clock,
            warning_days,
        }
    }

    /// Run one check over every active subscription ending within the
    /// warning window.
    ///
    /// At most one warning per subscription per calendar day is enqueued.
    pub async fn run(&self) -> AppResult<ExpiryReport> {
        let now = self.clock.now();
        let cutoff = now + Duration::days(i64::from(self.warning_days));
        let candidates = self.subscriptions.list_active_ending_before(cutoff).await?;

        let mut report = ExpiryReport::default();
        for record in candidates {
            let outcome = if record.ends_at <= now {
                self.expire(record, now).await.map(|()| {
                    report.expired += 1;
                })
            } else if record.warned_on_day_of(now) {
                Ok(())
            } else {
                self.warn(record, now).await.map(|()| {
                    report.warned += 1;
                })
            };

            if let Err(e) = outcome {
                warn!(error = %e, "Subscription expiry check failed for one record");
                report.failed += 1;
            }
        }

        if report.warned > 0 || report.expired > 0 {
            info!(
                warned = report.warned,
                expired = report.expired,
                failed = report.failed,
                "Subscription expiry check finished"
            );
        }
        Ok(report)
    }

    async fn warn(&self, mut record: SubscriptionRecord, now: DateTime<Utc>) -> AppResult<()> {
        let days_left = record.days_left(now);
        let (title, message) = if days_left <= 1 {
            (
                "Subscription Expires Tomorrow!".to_string(),
                "Your library subscription expires tomorrow. Please renew to keep your seat."
                    .to_string(),
            )
        } else {
            (
                format!("Subscription Expires in {days_left} Days"),
                format!(
                    "Your library subscription expires in {days_left} days. Please renew to keep your seat."
                ),
            )
        };

        self.notifications
            .create_system(
                record.recipient(),
                &title,
                &message,
                Priority::for_days_left(days_left),
                Some(record.booking_id),
            )
            .await?;

        record.last_warned_at = Some(now);
        record.updated_at = now;
        self.subscriptions.update(&record).await?;

        info!(
            booking_id = %record.booking_id,
            days_left,
            "Subscription expiry warning enqueued"
        );
        Ok(())
    }

    async fn expire(&self, mut record: SubscriptionRecord, now: DateTime<Utc>) -> AppResult<()> {
        match self.bookings.expire(record.booking_id).await {
            Ok(_) => {}
            // Cancelled or already expired elsewhere; the record still lapses.
            Err(e) if e.is(ErrorKind::InvalidTransition) => {
                warn!(
                    booking_id = %record.booking_id,
                    error = %e,
                    "Booking not active at subscription expiry"
                );
            }
            Err(e) => return Err(e),
        }

        self.notifications
            .create_system(
                record.recipient(),
                EXPIRED_TITLE,
                EXPIRED_MESSAGE,
                Priority::Urgent,
                Some(record.booking_id),
            )
            .await?;

        record.status = SubscriptionStatus::Expired;
        record.updated_at = now;
        self.subscriptions.update(&record).await?;

        info!(booking_id = %record.booking_id, "Subscription expired");
        Ok(())
    }
}

//! Idempotent provisioning keyed by booking id.
//!
//! The subscription record is written first, then the welcome
//! notification, then the booking is activated. A record whose booking is
//! still awaiting payment, or an active booking with no welcome, means a
//! previous run stopped part way; the next call finishes the remaining
//! writes without touching the backend again.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use seatdesk_core::config::SubscriptionConfig;
use seatdesk_core::error::{AppError, ErrorKind};
use seatdesk_core::events::BookingEvent;
use seatdesk_core::result::AppResult;
use seatdesk_core::traits::{Clock, ProvisioningBackend};
use seatdesk_core::types::{BookingId, SubscriptionPlan};
use seatdesk_database::{BookingStore, PaymentStore, SubscriptionStore};
use seatdesk_entity::booking::{Booking, BookingAction, BookingStatus};
use seatdesk_entity::notification::NotificationKind;
use seatdesk_entity::subscription::{SubscriptionRecord, SubscriptionStatus};

use crate::events::EventBus;
use crate::lock::BookingLocks;
use crate::notification::NotificationService;

const WELCOME_TITLE: &str = "Payment Confirmed - Welcome!";

/// Outcome of provisioning a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningResult {
    /// The provisioning record for the booking.
    pub record: SubscriptionRecord,
    /// `false` when the booking had already been provisioned.
    pub newly_provisioned: bool,
}

/// Creates exactly one account and subscription per paid booking.
#[derive(Debug, Clone)]
pub struct ProvisioningService {
    bookings: Arc<dyn BookingStore>,
    payments: Arc<dyn PaymentStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    backend: Arc<dyn ProvisioningBackend>,
    notifications: NotificationService,
    locks: BookingLocks,
    clock: Arc<dyn Clock>,
    events: EventBus,
    config: SubscriptionConfig,
}

impl ProvisioningService {
    /// Create a new provisioning service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        payments: Arc<dyn PaymentStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        backend: Arc<dyn ProvisioningBackend>,
        notifications: NotificationService,
        locks: BookingLocks,
        clock: Arc<dyn Clock>,
        events: EventBus,
        config: SubscriptionConfig,
    ) -> Self {
        Self {
            bookings,
            payments,
            subscriptions,
            backend,
            notifications,
            locks,
            clock,
            events,
            config,
        }
    }

    /// Provision the booking whose payment was verified.
    ///
    /// Safe to call any number of times, concurrently or not: the backend
    /// is called only while no record exists, under the booking's lock.
    pub async fn on_payment_verified(&self, booking_id: BookingId) -> AppResult<ProvisioningResult> {
        let _guard = self.locks.acquire(booking_id).await;
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {booking_id} not found")))?;

        if let Some(record) = self.subscriptions.get(booking_id).await? {
            match booking.status {
                BookingStatus::PaymentPending => {
                    warn!(booking_id = %booking_id, "Resuming activation of a provisioned booking");
                    self.activate(booking, &record).await?;
                }
                BookingStatus::Active => self.ensure_welcome(&record).await?,
                _ => {}
            }
            return Ok(ProvisioningResult {
                record,
                newly_provisioned: false,
            });
        }

        if booking.status != BookingStatus::PaymentPending {
            return Err(AppError::invalid_transition(format!(
                "Booking {booking_id} is {}, not awaiting payment",
                booking.status
            )));
        }
        let payment = self.payments.find_verified(booking_id).await?.ok_or_else(|| {
            AppError::invalid_transition(format!("Booking {booking_id} has no verified payment"))
        })?;

        let months = u32::try_from(booking.subscription_months)
            .map_err(|_| AppError::validation("Subscription months must be positive"))?;
        let plan = SubscriptionPlan {
            booking_id,
            library_id: booking.library_id,
            months,
            amount_paid: payment.amount,
            currency: payment.currency.clone(),
        };

        let account_id = self
            .backend
            .create_account(&booking.contact())
            .await
            .map_err(|e| external("create account", e))?;
        let subscription_id = self
            .backend
            .activate_subscription(account_id, &plan)
            .await
            .map_err(|e| external("activate subscription", e))?;

        let now = self.clock.now();
        let term_days = i64::from(self.config.days_per_month) * i64::from(months);
        let record = SubscriptionRecord {
            booking_id,
            account_id,
            subscription_id,
            library_id: booking.library_id,
            months: booking.subscription_months,
            starts_at: now,
            ends_at: now + Duration::days(term_days),
            status: SubscriptionStatus::Active,
            last_warned_at: None,
            created_at: now,
            updated_at: now,
        };
        self.subscriptions.insert(&record).await?;

        info!(
            booking_id = %booking_id,
            account_id = %account_id,
            subscription_id = %subscription_id,
            ends_at = %record.ends_at,
            "Booking provisioned"
        );
        self.activate(booking, &record).await?;

        Ok(ProvisioningResult {
            record,
            newly_provisioned: true,
        })
    }

    /// Enqueue the welcome notification, then move the booking to `active`.
    async fn activate(&self, mut booking: Booking, record: &SubscriptionRecord) -> AppResult<()> {
        self.ensure_welcome(record).await?;

        let from = booking.status;
        let now = self.clock.now();
        booking.status = from.apply(BookingAction::PaymentVerified)?;
        booking.paid_at = Some(now);
        booking.updated_at = now;
        self.bookings.update(&booking, from).await?;

        self.events.publish(
            self.clock.as_ref(),
            BookingEvent::Activated {
                booking_id: booking.id,
                account_id: record.account_id,
                subscription_id: record.subscription_id,
            },
        );
        Ok(())
    }

    /// Enqueue the welcome notification unless the booking already has one.
    async fn ensure_welcome(&self, record: &SubscriptionRecord) -> AppResult<()> {
        let existing = self.notifications.for_booking(record.booking_id).await?;
        if existing
            .iter()
            .any(|n| n.kind == NotificationKind::System && n.title == WELCOME_TITLE)
        {
            return Ok(());
        }

        let message = format!(
            "Your seat booking is confirmed. Your {}-month subscription is active until {}.",
            record.months,
            record.ends_at.format("%B %d, %Y")
        );
        self.notifications
            .create_system(
                record.recipient(),
                WELCOME_TITLE,
                &message,
                self.config.welcome_priority,
                Some(record.booking_id),
            )
            .await?;
        Ok(())
    }
}

fn external(step: &str, err: AppError) -> AppError {
    if err.kind == ErrorKind::ExternalService {
        err
    } else {
        AppError::with_source(
            ErrorKind::ExternalService,
            format!("Provisioning backend failed to {step}"),
            err,
        )
    }
}

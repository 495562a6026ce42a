//! Payment order creation and verification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use seatdesk_core::config::PaymentConfig;
use seatdesk_core::error::AppError;
use seatdesk_core::events::{BookingEvent, PaymentEvent};
use seatdesk_core::result::AppResult;
use seatdesk_core::traits::Clock;
use seatdesk_core::types::{BookingId, OrderId};
use seatdesk_database::{BookingStore, PaymentStore};
use seatdesk_entity::booking::{Booking, BookingAction, BookingStatus};
use seatdesk_entity::payment::{Payment, PaymentStatus};

use super::signature::SignatureVerifier;
use crate::events::EventBus;
use crate::lock::BookingLocks;

/// A payment callback as received from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCallback {
    /// The order the payment is for.
    pub order_id: OrderId,
    /// The provider's payment id.
    pub payment_id: String,
    /// Hex HMAC signature over `order_id|payment_id`.
    pub signature: String,
    /// Amount the provider reports as captured, if it reports one.
    pub amount: Option<i64>,
    /// Currency the provider reports, if it reports one.
    pub currency: Option<String>,
}

impl PaymentCallback {
    /// A callback carrying only the signed identifiers.
    pub fn new(
        order_id: impl Into<OrderId>,
        payment_id: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            payment_id: payment_id.into(),
            signature: signature.into(),
            amount: None,
            currency: None,
        }
    }

    /// Attach the amount and currency the provider reported.
    pub fn with_amount(mut self, amount: i64, currency: impl Into<String>) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.into());
        self
    }
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// The verified order.
    pub order_id: OrderId,
    /// The booking it pays for.
    pub booking_id: BookingId,
    /// The provider's payment id.
    pub external_payment_id: String,
    /// Amount verified, in minor units.
    pub amount: i64,
    /// When the order was verified.
    pub verified_at: DateTime<Utc>,
    /// `true` when this call found the order already verified.
    pub already_verified: bool,
}

impl VerificationResult {
    fn from_payment(payment: &Payment, already_verified: bool) -> AppResult<Self> {
        let (Some(external_payment_id), Some(verified_at)) =
            (payment.external_payment_id.clone(), payment.verified_at)
        else {
            return Err(AppError::internal(format!(
                "Verified order {} is missing its payment id or timestamp",
                payment.order_id
            )));
        };
        Ok(Self {
            order_id: payment.order_id.clone(),
            booking_id: payment.booking_id,
            external_payment_id,
            amount: payment.amount,
            verified_at,
            already_verified,
        })
    }

    /// The event provisioning consumes.
    pub fn event(&self) -> PaymentEvent {
        PaymentEvent::Verified {
            order_id: self.order_id.clone(),
            booking_id: self.booking_id,
            external_payment_id: self.external_payment_id.clone(),
        }
    }
}

/// Issues payment orders for approved bookings and verifies callbacks.
#[derive(Debug, Clone)]
pub struct PaymentService {
    bookings: Arc<dyn BookingStore>,
    payments: Arc<dyn PaymentStore>,
    locks: BookingLocks,
    verifier: SignatureVerifier,
    config: PaymentConfig,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl PaymentService {
    /// Create a new payment service.
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        payments: Arc<dyn PaymentStore>,
        locks: BookingLocks,
        config: PaymentConfig,
        clock: Arc<dyn Clock>,
        events: EventBus,
    ) -> Self {
        Self {
            verifier: SignatureVerifier::new(&config.key_secret),
            bookings,
            payments,
            locks,
            config,
            clock,
            events,
        }
    }

    /// The signature verifier in use.
    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Create (or return the open) payment order for a booking awaiting
    /// payment.
    pub async fn create_order(&self, booking_id: BookingId) -> AppResult<Payment> {
        let _guard = self.locks.acquire(booking_id).await;
        let booking = self.load_booking(booking_id).await?;
        self.issue_order(&booking).await
    }

    /// Whether a verified payment exists for the booking.
    pub(crate) async fn is_paid(&self, booking_id: BookingId) -> AppResult<bool> {
        Ok(self.payments.find_verified(booking_id).await?.is_some())
    }

    /// Order issuance for a booking the caller has already locked and read.
    /// A booking that is already paid gets no second order.
    pub(crate) async fn issue_order(&self, booking: &Booking) -> AppResult<Payment> {
        if booking.status != BookingStatus::PaymentPending {
            return Err(AppError::invalid_transition(format!(
                "Cannot create an order for a booking that is {}",
                booking.status
            )));
        }

        if let Some(paid) = self.payments.find_verified(booking.id).await? {
            return Err(AppError::invalid_transition(format!(
                "Booking {} is already paid by order {}",
                booking.id, paid.order_id
            )));
        }
        if let Some(open) = self.payments.find_open(booking.id).await? {
            return Ok(open);
        }

        let now = self.clock.now();
        let payment = Payment {
            order_id: OrderId::issue(&self.config.order_id_prefix),
            booking_id: booking.id,
            amount: booking.amount_due,
            currency: booking.currency.clone(),
            receipt: Payment::receipt_for(booking.id),
            notes: serde_json::json!({
                "booking_id": booking.id.to_string(),
                "student_name": booking.requester_name,
                "library_id": booking.library_id.to_string(),
            }),
            status: PaymentStatus::Created,
            external_payment_id: None,
            signature: None,
            failure_reason: None,
            created_at: now,
            verified_at: None,
            updated_at: now,
        };
        self.payments.insert(&payment).await?;

        info!(
            booking_id = %booking.id,
            order_id = %payment.order_id,
            amount = payment.amount,
            currency = %payment.currency,
            "Payment order created"
        );
        self.events.publish(
            self.clock.as_ref(),
            PaymentEvent::OrderCreated {
                order_id: payment.order_id.clone(),
                booking_id: booking.id,
                amount: payment.amount,
                currency: payment.currency.clone(),
            },
        );
        Ok(payment)
    }

    /// Verify a payment callback.
    ///
    /// A bad signature or amount marks an open order failed and leaves the
    /// booking awaiting payment, unless the configured failure limit is
    /// reached, in which case the booking is cancelled. Verifying an
    /// already-verified order with a valid signature returns the original
    /// result.
    pub async fn verify(&self, callback: &PaymentCallback) -> AppResult<VerificationResult> {
        let booking_id = self
            .payments
            .get(&callback.order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", callback.order_id)))?
            .booking_id;

        let _guard = self.locks.acquire(booking_id).await;
        let mut payment = self
            .payments
            .get(&callback.order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", callback.order_id)))?;

        if let Err(err) = self.verifier.verify(
            callback.order_id.as_str(),
            &callback.payment_id,
            &callback.signature,
        ) {
            warn!(
                order_id = %callback.order_id,
                booking_id = %booking_id,
                "Payment signature rejected"
            );
            if payment.status == PaymentStatus::Created {
                self.record_failure(&mut payment, callback, "signature mismatch")
                    .await?;
            }
            return Err(err);
        }

        match payment.status {
            PaymentStatus::Verified => {
                info!(order_id = %payment.order_id, "Duplicate verification ignored");
                return VerificationResult::from_payment(&payment, true);
            }
            PaymentStatus::Failed => {
                return Err(AppError::invalid_transition(format!(
                    "Order {} already failed verification; create a new order",
                    payment.order_id
                )));
            }
            PaymentStatus::Created => {}
        }

        let booking = self.load_booking(booking_id).await?;
        if booking.status != BookingStatus::PaymentPending {
            return Err(AppError::invalid_transition(format!(
                "Booking {} is {}, not awaiting payment",
                booking.id, booking.status
            )));
        }

        if let Some(reason) = amount_mismatch(&payment, &booking, callback) {
            warn!(
                order_id = %payment.order_id,
                booking_id = %booking.id,
                reason = %reason,
                "Payment amount rejected"
            );
            self.record_failure(&mut payment, callback, &reason).await?;
            return Err(AppError::amount_mismatch(reason));
        }

        let now = self.clock.now();
        payment.status = PaymentStatus::Verified;
        payment.external_payment_id = Some(callback.payment_id.clone());
        payment.signature = Some(callback.signature.clone());
        payment.verified_at = Some(now);
        payment.updated_at = now;
        self.payments.update(&payment, PaymentStatus::Created).await?;

        let result = VerificationResult::from_payment(&payment, false)?;
        info!(
            order_id = %result.order_id,
            booking_id = %result.booking_id,
            payment_id = %result.external_payment_id,
            "Payment verified"
        );
        self.events.publish(self.clock.as_ref(), result.event());
        Ok(result)
    }

    /// Mark the open order failed and count the failure on its booking.
    async fn record_failure(
        &self,
        payment: &mut Payment,
        callback: &PaymentCallback,
        reason: &str,
    ) -> AppResult<()> {
        let now = self.clock.now();
        payment.status = PaymentStatus::Failed;
        payment.external_payment_id = Some(callback.payment_id.clone());
        payment.signature = Some(callback.signature.clone());
        payment.failure_reason = Some(reason.to_string());
        payment.updated_at = now;
        self.payments.update(payment, PaymentStatus::Created).await?;

        self.events.publish(
            self.clock.as_ref(),
            PaymentEvent::Failed {
                order_id: payment.order_id.clone(),
                booking_id: payment.booking_id,
                reason: reason.to_string(),
            },
        );

        let mut booking = match self.bookings.get(payment.booking_id).await? {
            Some(booking) if booking.status == BookingStatus::PaymentPending => booking,
            _ => return Ok(()),
        };
        booking.failed_verifications += 1;
        let limit_reached = self
            .config
            .max_failed_verifications
            .is_some_and(|max| booking.failed_verifications >= max as i32);
        let action = if limit_reached {
            BookingAction::Cancel
        } else {
            BookingAction::PaymentFailed
        };
        booking.status = booking.status.apply(action)?;
        booking.updated_at = now;
        if limit_reached {
            booking.cancelled_at = Some(now);
        }
        self.bookings
            .update(&booking, BookingStatus::PaymentPending)
            .await?;

        if limit_reached {
            warn!(
                booking_id = %booking.id,
                failures = booking.failed_verifications,
                "Booking cancelled after repeated payment failures"
            );
            self.events.publish(
                self.clock.as_ref(),
                BookingEvent::Cancelled {
                    booking_id: booking.id,
                },
            );
        }
        Ok(())
    }

    async fn load_booking(&self, booking_id: BookingId) -> AppResult<Booking> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {booking_id} not found")))
    }
}

/// Why the order, the booking, and the callback disagree on money, if
/// they do.
fn amount_mismatch(
    payment: &Payment,
    booking: &Booking,
    callback: &PaymentCallback,
) -> Option<String> {
    if payment.amount != booking.amount_due || payment.currency != booking.currency {
        return Some(format!(
            "Order is for {} {}, booking expects {} {}",
            payment.amount, payment.currency, booking.amount_due, booking.currency
        ));
    }
    if let Some(reported) = callback.amount {
        if reported != payment.amount {
            return Some(format!(
                "Provider reported {reported}, order expects {}",
                payment.amount
            ));
        }
    }
    if let Some(currency) = &callback.currency {
        if !currency.eq_ignore_ascii_case(&payment.currency) {
            return Some(format!(
                "Provider reported currency {currency}, order expects {}",
                payment.currency
            ));
        }
    }
    None
}

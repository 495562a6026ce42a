//! Booking lifecycle operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info};

use seatdesk_core::error::AppError;
use seatdesk_core::events::BookingEvent;
use seatdesk_core::result::AppResult;
use seatdesk_core::traits::{Clock, LibraryDirectory};
use seatdesk_core::types::BookingId;
use seatdesk_database::BookingStore;
use seatdesk_entity::booking::{Booking, BookingAction, BookingRequest};
use seatdesk_entity::payment::Payment;

use super::availability::{SeatClaim, ensure_available};
use crate::events::EventBus;
use crate::lock::BookingLocks;
use crate::payment::PaymentService;

/// A booking that was approved, with the order issued for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    /// The booking, now awaiting payment.
    pub booking: Booking,
    /// The order the requester must pay.
    pub order: Payment,
}

/// Owns the booking lifecycle.
///
/// Every transition is a lookup in the booking transition table followed
/// by a compare-and-set write, under the booking's lock. A rejected
/// transition leaves the stored booking untouched.
#[derive(Debug, Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingStore>,
    directory: Arc<dyn LibraryDirectory>,
    payments: PaymentService,
    locks: BookingLocks,
    clock: Arc<dyn Clock>,
    events: EventBus,
    default_currency: String,
    approvals: Arc<Mutex<()>>,
}

impl BookingService {
    /// Create a new booking service.
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        directory: Arc<dyn LibraryDirectory>,
        payments: PaymentService,
        locks: BookingLocks,
        clock: Arc<dyn Clock>,
        events: EventBus,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            bookings,
            directory,
            payments,
            locks,
            clock,
            events,
            default_currency: default_currency.into(),
            approvals: Arc::new(Mutex::new(())),
        }
    }

    /// Read a booking without locking.
    pub async fn get(&self, booking_id: BookingId) -> AppResult<Booking> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {booking_id} not found")))
    }

    /// Validate a request, check seat availability, and store it as pending.
    pub async fn submit(&self, request: BookingRequest) -> AppResult<Booking> {
        request.validate()?;
        ensure_available(
            self.directory.as_ref(),
            self.bookings.as_ref(),
            SeatClaim::from(&request),
        )
        .await?;

        let booking = Booking::from_request(request, &self.default_currency, self.clock.now());
        self.bookings.insert(&booking).await?;

        info!(
            booking_id = %booking.id,
            library_id = %booking.library_id,
            amount_due = booking.amount_due,
            "Booking submitted"
        );
        self.events.publish(
            self.clock.as_ref(),
            BookingEvent::Submitted {
                booking_id: booking.id,
                library_id: booking.library_id,
            },
        );
        Ok(booking)
    }

    /// Approve a pending booking and issue its payment order.
    ///
    /// The seat is checked again, since pending bookings hold no seat. The
    /// booking passes through `approved` to `payment_pending` in one
    /// write. If the order cannot be issued the booking is put back to
    /// `pending` and the error returned.
    pub async fn approve(&self, booking_id: BookingId) -> AppResult<Approval> {
        let _guard = self.locks.acquire(booking_id).await;
        let original = self.get(booking_id).await?;

        let now = self.clock.now();
        let mut booking = original.clone();
        booking.status = original
            .status
            .apply(BookingAction::Approve)?
            .apply(BookingAction::RequestPayment)?;
        booking.approved_at = Some(now);
        booking.updated_at = now;

        // Seat checks and the write that takes the seat run one approval at a time.
        let seating = self.approvals.lock().await;
        ensure_available(
            self.directory.as_ref(),
            self.bookings.as_ref(),
            SeatClaim::from(&original),
        )
        .await?;
        self.bookings.update(&booking, original.status).await?;
        drop(seating);

        let order = match self.payments.issue_order(&booking).await {
            Ok(order) => order,
            Err(err) => {
                self.revert(&original, &booking).await;
                return Err(err);
            }
        };

        info!(
            booking_id = %booking.id,
            order_id = %order.order_id,
            "Booking approved"
        );
        self.events.publish(
            self.clock.as_ref(),
            BookingEvent::Approved {
                booking_id: booking.id,
                order_id: order.order_id.clone(),
            },
        );
        Ok(Approval { booking, order })
    }

    /// Reject a pending booking.
    pub async fn reject(&self, booking_id: BookingId, reason: &str) -> AppResult<Booking> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("A rejection reason is required"));
        }
        let booking = self
            .transition(booking_id, BookingAction::Reject, |b, _| {
                b.rejection_reason = Some(reason.to_string());
            })
            .await?;

        info!(booking_id = %booking.id, reason, "Booking rejected");
        self.events.publish(
            self.clock.as_ref(),
            BookingEvent::Rejected {
                booking_id: booking.id,
                reason: reason.to_string(),
            },
        );
        Ok(booking)
    }

    /// Cancel a booking that is not yet active.
    ///
    /// A booking with a verified payment is awaiting provisioning and can
    /// no longer be cancelled.
    pub async fn cancel(&self, booking_id: BookingId) -> AppResult<Booking> {
        let _guard = self.locks.acquire(booking_id).await;
        if self.payments.is_paid(booking_id).await? {
            return Err(AppError::invalid_transition(format!(
                "Booking {booking_id} is paid and awaiting provisioning"
            )));
        }
        let booking = self
            .transition_locked(booking_id, BookingAction::Cancel, |b, now| {
                b.cancelled_at = Some(now);
            })
            .await?;

        info!(booking_id = %booking.id, "Booking cancelled");
        self.events.publish(
            self.clock.as_ref(),
            BookingEvent::Cancelled {
                booking_id: booking.id,
            },
        );
        Ok(booking)
    }

    /// Move an active booking to `expired` when its subscription lapses.
    pub async fn expire(&self, booking_id: BookingId) -> AppResult<Booking> {
        let booking = self
            .transition(booking_id, BookingAction::Expire, |_, _| {})
            .await?;

        info!(booking_id = %booking.id, "Booking expired");
        self.events.publish(
            self.clock.as_ref(),
            BookingEvent::Expired {
                booking_id: booking.id,
            },
        );
        Ok(booking)
    }

    async fn transition(
        &self,
        booking_id: BookingId,
        action: BookingAction,
        update: impl FnOnce(&mut Booking, DateTime<Utc>),
    ) -> AppResult<Booking> {
        let _guard = self.locks.acquire(booking_id).await;
        self.transition_locked(booking_id, action, update).await
    }

    /// A transition for a booking whose lock the caller holds.
    async fn transition_locked(
        &self,
        booking_id: BookingId,
        action: BookingAction,
        update: impl FnOnce(&mut Booking, DateTime<Utc>),
    ) -> AppResult<Booking> {
        let mut booking = self.get(booking_id).await?;

        let from = booking.status;
        let now = self.clock.now();
        booking.status = from.apply(action)?;
        booking.updated_at = now;
        update(&mut booking, now);
        self.bookings.update(&booking, from).await?;
        Ok(booking)
    }

    /// Undo an approval whose order could not be issued.
    async fn revert(&self, original: &Booking, approved: &Booking) {
        if let Err(err) = self.bookings.update(original, approved.status).await {
            error!(
                booking_id = %original.id,
                error = %err,
                "Failed to revert approval after order creation failed"
            );
        }
    }
}

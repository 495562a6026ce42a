//! Booking repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use seatdesk_core::error::{AppError, ErrorKind};
use seatdesk_core::result::AppResult;
use seatdesk_core::types::{BookingId, LibraryId};
use seatdesk_entity::booking::{Booking, BookingStatus};

use super::map_write_error;
use crate::store::BookingStore;

/// PostgreSQL-backed booking store.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn insert(&self, booking: &Booking) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO bookings (id, requester_name, requester_email, requester_mobile, requester_address, \
             library_id, seat_id, window_start, window_end, subscription_months, amount_due, currency, purpose, \
             status, rejection_reason, failed_verifications, created_at, approved_at, paid_at, cancelled_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)",
        )
        .bind(booking.id)
        .bind(&booking.requester_name)
        .bind(&booking.requester_email)
        .bind(&booking.requester_mobile)
        .bind(&booking.requester_address)
        .bind(booking.library_id)
        .bind(&booking.seat_id)
        .bind(booking.window_start)
        .bind(booking.window_end)
        .bind(booking.subscription_months)
        .bind(booking.amount_due)
        .bind(&booking.currency)
        .bind(&booking.purpose)
        .bind(booking.status)
        .bind(&booking.rejection_reason)
        .bind(booking.failed_verifications)
        .bind(booking.created_at)
        .bind(booking.approved_at)
        .bind(booking.paid_at)
        .bind(booking.cancelled_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to insert booking", e))?;
        Ok(())
    }

    async fn get(&self, id: BookingId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find booking", e))
    }

    async fn update(&self, booking: &Booking, expected: BookingStatus) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $3, rejection_reason = $4, failed_verifications = $5, \
             approved_at = $6, paid_at = $7, cancelled_at = $8, updated_at = $9 \
             WHERE id = $1 AND status = $2",
        )
        .bind(booking.id)
        .bind(expected)
        .bind(booking.status)
        .bind(&booking.rejection_reason)
        .bind(booking.failed_verifications)
        .bind(booking.approved_at)
        .bind(booking.paid_at)
        .bind(booking.cancelled_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update booking", e))?;

        if result.rows_affected() == 0 {
            return match self.get(booking.id).await? {
                Some(current) => Err(AppError::conflict(format!(
                    "Booking {} is {}, expected {expected}",
                    booking.id, current.status
                ))),
                None => Err(AppError::not_found(format!("Booking {} not found", booking.id))),
            };
        }
        Ok(())
    }

    async fn find_occupying(
        &self,
        library_id: LibraryId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE library_id = $1 \
             AND status IN ('approved', 'payment_pending', 'active') \
             AND window_start < $3 AND $2 < window_end",
        )
        .bind(library_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list occupying bookings", e))
    }
}

//! Payment order repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use seatdesk_core::error::{AppError, ErrorKind};
use seatdesk_core::result::AppResult;
use seatdesk_core::types::{BookingId, OrderId};
use seatdesk_entity::payment::{Payment, PaymentStatus};

use super::map_write_error;
use crate::store::PaymentStore;

/// PostgreSQL-backed payment store.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Create a new payment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_with_status(
        &self,
        booking_id: BookingId,
        status: PaymentStatus,
    ) -> AppResult<Option<Payment>> {
        sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE booking_id = $1 AND status = $2 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(booking_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find payment", e))
    }
}

#[async_trait]
impl PaymentStore for PaymentRepository {
    async fn insert(&self, payment: &Payment) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO payments (order_id, booking_id, amount, currency, receipt, notes, status, \
             external_payment_id, signature, failure_reason, created_at, verified_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&payment.order_id)
        .bind(payment.booking_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.receipt)
        .bind(&payment.notes)
        .bind(payment.status)
        .bind(&payment.external_payment_id)
        .bind(&payment.signature)
        .bind(&payment.failure_reason)
        .bind(payment.created_at)
        .bind(payment.verified_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to insert payment", e))?;
        Ok(())
    }

    async fn get(&self, order_id: &OrderId) -> AppResult<Option<Payment>> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find payment", e))
    }

    async fn find_open(&self, booking_id: BookingId) -> AppResult<Option<Payment>> {
        self.find_with_status(booking_id, PaymentStatus::Created).await
    }

    async fn find_verified(&self, booking_id: BookingId) -> AppResult<Option<Payment>> {
        self.find_with_status(booking_id, PaymentStatus::Verified).await
    }

    async fn update(&self, payment: &Payment, expected: PaymentStatus) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE payments SET status = $3, external_payment_id = $4, signature = $5, \
             failure_reason = $6, verified_at = $7, updated_at = $8 \
             WHERE order_id = $1 AND status = $2",
        )
        .bind(&payment.order_id)
        .bind(expected)
        .bind(payment.status)
        .bind(&payment.external_payment_id)
        .bind(&payment.signature)
        .bind(&payment.failure_reason)
        .bind(payment.verified_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to update payment", e))?;

        if result.rows_affected() == 0 {
            return match self.get(&payment.order_id).await? {
                Some(current) => Err(AppError::conflict(format!(
                    "Order {} is {}, expected {expected}",
                    payment.order_id, current.status
                ))),
                None => Err(AppError::not_found(format!(
                    "Order {} not found",
                    payment.order_id
                ))),
            };
        }
        Ok(())
    }
}

//! Subscription record repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use seatdesk_core::error::{AppError, ErrorKind};
use seatdesk_core::result::AppResult;
use seatdesk_core::types::BookingId;
use seatdesk_entity::subscription::SubscriptionRecord;

use super::map_write_error;
use crate::store::SubscriptionStore;

/// PostgreSQL-backed provisioning record store.
#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn insert(&self, record: &SubscriptionRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO subscriptions (booking_id, account_id, subscription_id, library_id, months, \
             starts_at, ends_at, status, last_warned_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(record.booking_id)
        .bind(record.account_id)
        .bind(record.subscription_id)
        .bind(record.library_id)
        .bind(record.months)
        .bind(record.starts_at)
        .bind(record.ends_at)
        .bind(record.status)
        .bind(record.last_warned_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to insert subscription", e))?;
        Ok(())
    }

    async fn get(&self, booking_id: BookingId) -> AppResult<Option<SubscriptionRecord>> {
        sqlx::query_as::<_, SubscriptionRecord>("SELECT * FROM subscriptions WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find subscription", e))
    }

    async fn list_active_ending_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<SubscriptionRecord>> {
        sqlx::query_as::<_, SubscriptionRecord>(
            "SELECT * FROM subscriptions WHERE status = 'active' AND ends_at <= $1 ORDER BY ends_at",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list expiring subscriptions", e))
    }

    async fn update(&self, record: &SubscriptionRecord) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE subscriptions SET status = $2, last_warned_at = $3, updated_at = $4 \
             WHERE booking_id = $1",
        )
        .bind(record.booking_id)
        .bind(record.status)
        .bind(record.last_warned_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "No subscription for booking {}",
                record.booking_id
            )));
        }
        Ok(())
    }
}

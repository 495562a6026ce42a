//! Notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use seatdesk_core::error::{AppError, ErrorKind};
use seatdesk_core::result::AppResult;
use seatdesk_core::types::{BookingId, NotificationId, PageRequest, PageResponse, RecipientId};
use seatdesk_entity::notification::Notification;

use super::map_write_error;
use crate::store::{NotificationFilter, NotificationStore};

/// PostgreSQL-backed notification store.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert_many(&self, notifications: &[Notification]) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))?;

        for n in notifications {
            sqlx::query(
                "INSERT INTO notifications (id, recipient_id, title, message, kind, priority, scheduled_for, \
                 sent_at, failed_attempts, last_failed_at, read, related_task_id, related_exam_id, \
                 related_booking_id, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
            )
            .bind(n.id)
            .bind(n.recipient_id)
            .bind(&n.title)
            .bind(&n.message)
            .bind(n.kind)
            .bind(n.priority)
            .bind(n.scheduled_for)
            .bind(n.sent_at)
            .bind(n.failed_attempts)
            .bind(n.last_failed_at)
            .bind(n.read)
            .bind(n.related_task_id)
            .bind(n.related_exam_id)
            .bind(n.related_booking_id)
            .bind(n.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("Failed to insert notification", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit notifications", e))
    }

    async fn get(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find notification", e))
    }

    async fn list_due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE sent_at IS NULL AND scheduled_for <= $1 \
             ORDER BY last_failed_at ASC NULLS FIRST, scheduled_for ASC, created_at ASC LIMIT $2",
        )
        .bind(now)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list due notifications", e))
    }

    async fn mark_sent(&self, id: NotificationId, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET sent_at = $2 WHERE id = $1 AND sent_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark notification sent", e))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        match self.get(id).await? {
            Some(_) => Ok(false),
            None => Err(AppError::not_found(format!("Notification {id} not found"))),
        }
    }

    async fn mark_failed(&self, id: NotificationId, at: DateTime<Utc>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET failed_attempts = failed_attempts + 1, last_failed_at = $2 \
             WHERE id = $1 AND sent_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record dispatch failure", e))?;

        if result.rows_affected() == 0 && self.get(id).await?.is_none() {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        Ok(())
    }

    async fn list_for_booking(&self, booking_id: BookingId) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE related_booking_id = $1 \
             ORDER BY created_at ASC, scheduled_for ASC",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list booking notifications", e))
    }

    async fn mark_read(&self, id: NotificationId, recipient_id: RecipientId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, recipient_id: RecipientId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        filter: NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 \
             AND ($2::notification_kind IS NULL OR kind = $2) AND (NOT $3 OR read = FALSE)",
        )
        .bind(recipient_id)
        .bind(filter.kind)
        .bind(filter.unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count notifications", e))?;

        let items = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 \
             AND ($2::notification_kind IS NULL OR kind = $2) AND (NOT $3 OR read = FALSE) \
             ORDER BY scheduled_for DESC LIMIT $4 OFFSET $5",
        )
        .bind(recipient_id)
        .bind(filter.kind)
        .bind(filter.unread_only)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))?;

        Ok(PageResponse::new(items, page, total.max(0) as u64))
    }

    async fn count_unread(&self, recipient_id: RecipientId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))?;
        Ok(count.max(0) as u64)
    }
}

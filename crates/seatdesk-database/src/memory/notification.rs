//! In-memory notification store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use seatdesk_core::error::AppError;
use seatdesk_core::result::AppResult;
use seatdesk_core::types::{BookingId, NotificationId, PageRequest, PageResponse, RecipientId};
use seatdesk_entity::notification::Notification;

use crate::store::{NotificationFilter, NotificationStore};

/// Notifications held in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotificationStore {
    notifications: Arc<DashMap<NotificationId, Notification>>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored notification, ordered by schedule.
    pub fn all(&self) -> Vec<Notification> {
        let mut all: Vec<Notification> =
            self.notifications.iter().map(|n| n.clone()).collect();
        all.sort_by_key(|n| n.scheduled_for);
        all
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn insert_many(&self, notifications: &[Notification]) -> AppResult<()> {
        if let Some(dup) = notifications
            .iter()
            .find(|n| self.notifications.contains_key(&n.id))
        {
            return Err(AppError::conflict(format!(
                "Notification {} already exists",
                dup.id
            )));
        }
        for notification in notifications {
            self.notifications.insert(notification.id, notification.clone());
        }
        Ok(())
    }

    async fn get(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        Ok(self.notifications.get(&id).map(|n| n.clone()))
    }

    async fn list_due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<Notification>> {
        let mut due: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.is_due(now))
            .map(|n| n.clone())
            .collect();
        due.sort_by_key(|n| (n.last_failed_at, n.scheduled_for, n.created_at));
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn mark_sent(&self, id: NotificationId, at: DateTime<Utc>) -> AppResult<bool> {
        let mut stored = self
            .notifications
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        if stored.sent_at.is_some() {
            return Ok(false);
        }
        stored.sent_at = Some(at);
        Ok(true)
    }

    async fn mark_failed(&self, id: NotificationId, at: DateTime<Utc>) -> AppResult<()> {
        let mut stored = self
            .notifications
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        if stored.sent_at.is_none() {
            stored.failed_attempts += 1;
            stored.last_failed_at = Some(at);
        }
        Ok(())
    }

    async fn list_for_booking(&self, booking_id: BookingId) -> AppResult<Vec<Notification>> {
        let mut related: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.related_booking_id == Some(booking_id))
            .map(|n| n.clone())
            .collect();
        related.sort_by_key(|n| (n.created_at, n.scheduled_for));
        Ok(related)
    }

    async fn mark_read(&self, id: NotificationId, recipient_id: RecipientId) -> AppResult<bool> {
        match self.notifications.get_mut(&id) {
            Some(mut stored) if stored.recipient_id == recipient_id => {
                stored.read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_read(&self, recipient_id: RecipientId) -> AppResult<u64> {
        let mut updated = 0;
        for mut entry in self.notifications.iter_mut() {
            if entry.recipient_id == recipient_id && !entry.read {
                entry.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        filter: NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let mut matching: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && filter.matches(n))
            .map(|n| n.clone())
            .collect();
        matching.sort_by(|a, b| b.scheduled_for.cmp(&a.scheduled_for));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn count_unread(&self, recipient_id: RecipientId) -> AppResult<u64> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .count() as u64)
    }
}

//! Notification CRUD on top of the notification store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use seatdesk_core::error::AppError;
use seatdesk_core::result::AppResult;
use seatdesk_core::traits::Clock;
use seatdesk_core::types::{
    BookingId, LeadInterval, NotificationId, PageRequest, PageResponse, Priority, RecipientId,
};
use seatdesk_database::{NotificationFilter, NotificationStore};
use seatdesk_entity::notification::{NewNotification, Notification, NotificationKind};

use crate::reminder::{ReminderPolicy, ReminderTarget};

/// Creates notifications and serves the recipient's inbox.
#[derive(Debug, Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    policy: ReminderPolicy,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    /// Create a new notification service.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        policy: ReminderPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    /// Persist reminders for a task or exam due at `due`.
    ///
    /// With `intervals` unset the configured defaults for the event type
    /// are used.
    pub async fn schedule_reminders(
        &self,
        recipient_id: RecipientId,
        target: &ReminderTarget,
        due: DateTime<Utc>,
        intervals: Option<&[LeadInterval]>,
    ) -> AppResult<Vec<Notification>> {
        let intervals = intervals.unwrap_or_else(|| self.policy.defaults_for(target));
        let drafts = ReminderPolicy::drafts(recipient_id, target, due, intervals);
        let created = self.enqueue(drafts).await?;
        info!(
            recipient_id = %recipient_id,
            reminders = created.len(),
            due = %due,
            "Reminders scheduled"
        );
        Ok(created)
    }

    /// An admin notification, due at `scheduled_for` or immediately.
    pub async fn create_general(
        &self,
        recipient_id: RecipientId,
        title: &str,
        message: &str,
        priority: Priority,
        scheduled_for: Option<DateTime<Utc>>,
    ) -> AppResult<Notification> {
        let when = scheduled_for.unwrap_or_else(|| self.clock.now());
        self.create_one(NewNotification::new(
            recipient_id,
            NotificationKind::General,
            priority,
            title,
            message,
            when,
        ))
        .await
    }

    /// A system notification, due immediately.
    pub async fn create_system(
        &self,
        recipient_id: RecipientId,
        title: &str,
        message: &str,
        priority: Priority,
        booking_id: Option<BookingId>,
    ) -> AppResult<Notification> {
        let mut draft = NewNotification::new(
            recipient_id,
            NotificationKind::System,
            priority,
            title,
            message,
            self.clock.now(),
        );
        draft.related_booking_id = booking_id;
        self.create_one(draft).await
    }

    /// Persist a batch of drafts atomically.
    pub async fn enqueue(&self, drafts: Vec<NewNotification>) -> AppResult<Vec<Notification>> {
        if let Some(blank) = drafts.iter().find(|d| d.title.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "Notification for {} has an empty title",
                blank.recipient_id
            )));
        }
        let now = self.clock.now();
        let notifications: Vec<Notification> = drafts
            .into_iter()
            .map(|d| d.into_notification(now))
            .collect();
        self.store.insert_many(&notifications).await?;
        Ok(notifications)
    }

    async fn create_one(&self, draft: NewNotification) -> AppResult<Notification> {
        self.enqueue(vec![draft])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal("Notification was not created"))
    }

    /// Page through a recipient's notifications.
    pub async fn list(
        &self,
        recipient_id: RecipientId,
        filter: NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.store.list_for_recipient(recipient_id, filter, page).await
    }

    /// Number of unread notifications.
    pub async fn unread_count(&self, recipient_id: RecipientId) -> AppResult<u64> {
        self.store.count_unread(recipient_id).await
    }

    /// Mark one notification read.
    pub async fn mark_read(
        &self,
        recipient_id: RecipientId,
        notification_id: NotificationId,
    ) -> AppResult<()> {
        if self.store.mark_read(notification_id, recipient_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "Notification {notification_id} not found"
            )))
        }
    }

    /// Mark all of a recipient's notifications read.
    pub async fn mark_all_read(&self, recipient_id: RecipientId) -> AppResult<u64> {
        self.store.mark_all_read(recipient_id).await
    }

    /// Unsent notifications due now, oldest first.
    pub async fn due(&self, limit: u32) -> AppResult<Vec<Notification>> {
        self.store.list_due(self.clock.now(), limit).await
    }

    /// Record a failed dispatch attempt. The notification stays due and
    /// moves behind rows that have not failed.
    pub async fn mark_failed(&self, notification_id: NotificationId) -> AppResult<()> {
        self.store
            .mark_failed(notification_id, self.clock.now())
            .await
    }

    /// Notifications related to a booking, oldest first.
    pub async fn for_booking(&self, booking_id: BookingId) -> AppResult<Vec<Notification>> {
        self.store.list_for_booking(booking_id).await
    }

    /// Record dispatch. Returns `false` if it was already recorded.
    pub async fn mark_sent(&self, notification_id: NotificationId) -> AppResult<bool> {
        let first = self
            .store
            .mark_sent(notification_id, self.clock.now())
            .await?;
        if !first {
            debug!(notification_id = %notification_id, "Notification was already marked sent");
        }
        Ok(first)
    }
}

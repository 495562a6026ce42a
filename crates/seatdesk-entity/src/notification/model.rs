//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seatdesk_core::types::{BookingId, ExamId, NotificationId, Priority, RecipientId, TaskId};

use super::kind::NotificationKind;

/// A notification scheduled for delivery to a recipient.
///
/// `scheduled_for` never changes after creation and `sent_at` is set at
/// most once; after that only `read` may change. Failed dispatch attempts
/// are counted so the due queue can put them behind untried rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient.
    pub recipient_id: RecipientId,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// What produced this notification.
    pub kind: NotificationKind,
    /// Priority band.
    pub priority: Priority,
    /// When the notification becomes due.
    pub scheduled_for: DateTime<Utc>,
    /// When it was dispatched.
    pub sent_at: Option<DateTime<Utc>>,
    /// Dispatch attempts that failed or timed out.
    pub failed_attempts: i32,
    /// When the last dispatch attempt failed.
    pub last_failed_at: Option<DateTime<Utc>>,
    /// Whether the recipient has read it.
    pub read: bool,
    /// Related task, for task reminders.
    pub related_task_id: Option<TaskId>,
    /// Related exam, for exam reminders.
    pub related_exam_id: Option<ExamId>,
    /// Related booking, for welcome and subscription notices.
    pub related_booking_id: Option<BookingId>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Whether the notification is due and not yet dispatched.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.sent_at.is_none() && self.scheduled_for <= now
    }
}

/// A notification that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    /// The recipient.
    pub recipient_id: RecipientId,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// What produced this notification.
    pub kind: NotificationKind,
    /// Priority band.
    pub priority: Priority,
    /// When the notification becomes due.
    pub scheduled_for: DateTime<Utc>,
    /// Related task.
    pub related_task_id: Option<TaskId>,
    /// Related exam.
    pub related_exam_id: Option<ExamId>,
    /// Related booking.
    pub related_booking_id: Option<BookingId>,
}

impl NewNotification {
    /// A draft with no related references.
    pub fn new(
        recipient_id: RecipientId,
        kind: NotificationKind,
        priority: Priority,
        title: impl Into<String>,
        message: impl Into<String>,
        scheduled_for: DateTime<Utc>,
    ) -> Self {
        Self {
            recipient_id,
            title: title.into(),
            message: message.into(),
            kind,
            priority,
            scheduled_for,
            related_task_id: None,
            related_exam_id: None,
            related_booking_id: None,
        }
    }

    /// Attach a related booking.
    pub fn for_booking(mut self, booking_id: BookingId) -> Self {
        self.related_booking_id = Some(booking_id);
        self
    }

    /// Materialize the draft as an unsent, unread notification.
    pub fn into_notification(self, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id: NotificationId::new(),
            recipient_id: self.recipient_id,
            title: self.title,
            message: self.message,
            kind: self.kind,
            priority: self.priority,
            scheduled_for: self.scheduled_for,
            sent_at: None,
            failed_attempts: 0,
            last_failed_at: None,
            read: false,
            related_task_id: self.related_task_id,
            related_exam_id: self.related_exam_id,
            related_booking_id: self.related_booking_id,
            created_at,
        }
    }
}

//! Notification type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Reminder ahead of a task due date.
    TaskReminder,
    /// Reminder ahead of an exam date.
    ExamReminder,
    /// Sent by an admin.
    General,
    /// Generated by the system (welcome, subscription expiry).
    System,
}

impl NotificationKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskReminder => "task_reminder",
            Self::ExamReminder => "exam_reminder",
            Self::General => "general",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Notification priority bands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Urgency of a notification. Ordered from `Low` to `Urgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "notification_priority", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Informational.
    Low,
    /// Worth reading soon.
    Medium,
    /// Needs attention today.
    High,
    /// Needs attention now.
    Urgent,
}

impl Priority {
    /// Return the priority as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Priority of a subscription expiry warning with `days_left` days
    /// remaining.
    pub fn for_days_left(days_left: i64) -> Self {
        match days_left {
            i64::MIN..=1 => Self::Urgent,
            2..=3 => Self::High,
            _ => Self::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Subscription provisioning configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::Priority;

/// Subscription term settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Days counted per subscribed month.
    #[serde(default = "default_days_per_month")]
    pub days_per_month: u32,
    /// Priority of the welcome notification sent after provisioning.
    #[serde(default = "default_welcome_priority")]
    pub welcome_priority: Priority,
}

impl SubscriptionConfig {
    /// Validate numeric bounds.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.days_per_month == 0 {
            return Err(AppError::configuration(
                "subscription.days_per_month must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            days_per_month: default_days_per_month(),
            welcome_priority: default_welcome_priority(),
        }
    }
}

fn default_days_per_month() -> u32 {
    30
}

fn default_welcome_priority() -> Priority {
    Priority::High
}

//! Notification scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Settings for the recurring notification scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the scheduler is started with the application.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Delay before the first tick, so a restart does not fire a burst of
    /// sends during boot.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_seconds: u64,
    /// Interval between ticks.
    #[serde(default = "default_loop_interval")]
    pub loop_interval_seconds: u64,
    /// Whether subscription expiry checks run at all.
    #[serde(default = "default_true")]
    pub subscription_checks_enabled: bool,
    /// Run subscription expiry checks at most once per calendar day
    /// (otherwise on every tick).
    #[serde(default = "default_true")]
    pub subscription_checks_daily: bool,
    /// Upper bound on a single delivery call.
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_seconds: u64,
    /// Maximum number of due notifications processed per tick.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Warn subscribers this many days before their subscription ends.
    #[serde(default = "default_warning_days")]
    pub expiry_warning_days: u32,
}

impl SchedulerConfig {
    /// Initial delay as a [`Duration`].
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_seconds)
    }

    /// Tick interval as a [`Duration`]; never shorter than one second.
    pub fn loop_interval(&self) -> Duration {
        Duration::from_secs(self.loop_interval_seconds.max(1))
    }

    /// Delivery timeout as a [`Duration`].
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_seconds)
    }

    /// Validate numeric bounds.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.loop_interval_seconds == 0 {
            return Err(AppError::configuration(
                "scheduler.loop_interval_seconds must be at least 1",
            ));
        }
        if self.batch_size == 0 {
            return Err(AppError::configuration(
                "scheduler.batch_size must be at least 1",
            ));
        }
        if self.delivery_timeout_seconds == 0 {
            return Err(AppError::configuration(
                "scheduler.delivery_timeout_seconds must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_seconds: default_initial_delay(),
            loop_interval_seconds: default_loop_interval(),
            subscription_checks_enabled: true,
            subscription_checks_daily: true,
            delivery_timeout_seconds: default_delivery_timeout(),
            batch_size: default_batch_size(),
            expiry_warning_days: default_warning_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_initial_delay() -> u64 {
    60
}

fn default_loop_interval() -> u64 {
    60
}

fn default_delivery_timeout() -> u64 {
    10
}

fn default_batch_size() -> u32 {
    100
}

fn default_warning_days() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_rejected() {
        let config = SchedulerConfig {
            loop_interval_seconds: 0,
            ..SchedulerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

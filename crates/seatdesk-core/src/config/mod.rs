//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files plus `SEATDESK__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section.

pub mod logging;
pub mod payment;
pub mod reminder;
pub mod scheduler;
pub mod subscription;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::payment::PaymentConfig;
pub use self::reminder::ReminderConfig;
pub use self::scheduler::SchedulerConfig;
pub use self::subscription::SubscriptionConfig;

use crate::error::AppError;
use crate::types::LibraryId;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// configuration (default.toml + environment overlay + env vars).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Background notification scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Payment order and verification settings.
    pub payment: PaymentConfig,
    /// Reminder lead intervals per event type.
    #[serde(default)]
    pub reminders: ReminderConfig,
    /// Subscription provisioning settings.
    #[serde(default)]
    pub subscription: SubscriptionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Libraries accepting bookings and their seat capacities.
    #[serde(default)]
    pub libraries: Vec<LibraryConfig>,
}

/// Seat capacity of one library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Library identifier.
    pub id: LibraryId,
    /// Total bookable seats.
    pub total_seats: u32,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, then `config/{env}`, then environment
    /// variables prefixed with `SEATDESK__` (e.g.
    /// `SEATDESK__PAYMENT__KEY_SECRET`). The result is validated.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SEATDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject configurations the services cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        self.payment.validate()?;
        self.scheduler.validate()?;
        self.subscription.validate()?;
        if let Some(library) = self.libraries.iter().find(|l| l.total_seats == 0) {
            return Err(AppError::configuration(format!(
                "libraries: {} must have at least one seat",
                library.id
            )));
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

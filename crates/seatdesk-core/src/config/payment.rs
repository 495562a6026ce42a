//! Payment order and verification configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Payment provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Public key id of the merchant account.
    #[serde(default)]
    pub key_id: String,
    /// Shared secret used to sign payment callbacks.
    pub key_secret: String,
    /// Currency used for new orders.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Prefix for issued order ids.
    #[serde(default = "default_order_prefix")]
    pub order_id_prefix: String,
    /// Number of failed verifications after which the booking is
    /// cancelled. `None` allows unlimited retries.
    #[serde(default)]
    pub max_failed_verifications: Option<u32>,
}

impl PaymentConfig {
    /// Validate that a signing secret is present.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.key_secret.trim().is_empty() {
            return Err(AppError::configuration("payment.key_secret must be set"));
        }
        if self.currency.len() != 3 {
            return Err(AppError::configuration(format!(
                "payment.currency must be a 3-letter code, got '{}'",
                self.currency
            )));
        }
        if self.max_failed_verifications == Some(0) {
            return Err(AppError::configuration(
                "payment.max_failed_verifications must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("currency", &self.currency)
            .field("order_id_prefix", &self.order_id_prefix)
            .field("max_failed_verifications", &self.max_failed_verifications)
            .finish()
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_order_prefix() -> String {
    "order_".to_string()
}

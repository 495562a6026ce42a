//! The payment-callback path: verify, then provision.

use serde::{Deserialize, Serialize};
use tracing::info;

use seatdesk_core::result::AppResult;

use crate::payment::{PaymentCallback, PaymentService, VerificationResult};
use crate::provisioning::{ProvisioningResult, ProvisioningService};

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    /// The verification result.
    pub verification: VerificationResult,
    /// The provisioning result.
    pub provisioning: ProvisioningResult,
}

/// Runs verification and provisioning for one payment callback.
///
/// Duplicate callbacks for the same order are harmless: verification
/// returns the prior result and provisioning returns the existing record.
#[derive(Debug, Clone)]
pub struct CheckoutCoordinator {
    payments: PaymentService,
    provisioning: ProvisioningService,
}

impl CheckoutCoordinator {
    /// Create a new coordinator.
    pub fn new(payments: PaymentService, provisioning: ProvisioningService) -> Self {
        Self {
            payments,
            provisioning,
        }
    }

    /// Verify the callback and provision the booking it pays for.
    pub async fn verify_and_provision(&self, callback: &PaymentCallback) -> AppResult<CheckoutOutcome> {
        let verification = self.payments.verify(callback).await?;
        let provisioning = self
            .provisioning
            .on_payment_verified(verification.booking_id)
            .await?;

        info!(
            order_id = %verification.order_id,
            booking_id = %verification.booking_id,
            newly_provisioned = provisioning.newly_provisioned,
            "Checkout completed"
        );
        Ok(CheckoutOutcome {
            verification,
            provisioning,
        })
    }
}

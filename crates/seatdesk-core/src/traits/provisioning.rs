//! Account and subscription provisioning backend.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{AccountId, ContactInfo, SubscriptionId, SubscriptionPlan};

/// The external system that owns customer accounts and subscriptions.
///
/// Called at most once per booking by the provisioning service; the
/// service holds the idempotency guard, so implementations need not.
#[async_trait]
pub trait ProvisioningBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Create a customer account for the booking's requester.
    async fn create_account(&self, contact: &ContactInfo) -> AppResult<AccountId>;

    /// Activate a subscription on an existing account.
    async fn activate_subscription(
        &self,
        account_id: AccountId,
        plan: &SubscriptionPlan,
    ) -> AppResult<SubscriptionId>;
}

//! Periodic jobs run by the scheduler alongside notification dispatch.

pub mod subscription_expiry;

pub use subscription_expiry::{ExpiryReport, SubscriptionExpiryCheck};

//! Subscription provisioning records.

pub mod model;

pub use model::{SubscriptionRecord, SubscriptionStatus};

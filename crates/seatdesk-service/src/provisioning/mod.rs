//! Account and subscription provisioning after verified payment.

pub mod service;

pub use service::{ProvisioningResult, ProvisioningService};

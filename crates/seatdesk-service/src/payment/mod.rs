//! Payment order issuance and callback verification.

pub mod service;
pub mod signature;

pub use service::{PaymentCallback, PaymentService, VerificationResult};
pub use signature::SignatureVerifier;

//! # seatdesk-service
//!
//! Business logic for SeatDesk. Each service owns one lifecycle: the
//! booking state machine, payment order issuance and verification,
//! provisioning, and reminder/notification scheduling.
//!
//! Services follow constructor injection: stores, collaborators, and the
//! clock are provided at construction time via `Arc` references. Every
//! operation that changes a booking or its payment runs under that
//! booking's lock from the shared [`BookingLocks`] registry.

pub mod booking;
pub mod checkout;
pub mod events;
pub mod lock;
pub mod notification;
pub mod payment;
pub mod provisioning;
pub mod reminder;

pub use booking::{Approval, BookingService};
pub use checkout::{CheckoutCoordinator, CheckoutOutcome};
pub use events::EventBus;
pub use lock::{BookingGuard, BookingLocks};
pub use notification::NotificationService;
pub use payment::{PaymentCallback, PaymentService, SignatureVerifier, VerificationResult};
pub use provisioning::{ProvisioningResult, ProvisioningService};
pub use reminder::{ReminderPolicy, ReminderTarget};

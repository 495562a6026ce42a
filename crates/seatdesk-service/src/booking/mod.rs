//! Booking state machine service.

pub mod availability;
pub mod service;

pub use service::{Approval, BookingService};

//! Booking domain entities.

pub mod model;
pub mod request;
pub mod status;

pub use model::Booking;
pub use request::BookingRequest;
pub use status::{BookingAction, BookingStatus, TRANSITIONS};

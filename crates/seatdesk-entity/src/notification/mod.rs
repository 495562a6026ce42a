//! Notification domain entities.

pub mod kind;
pub mod model;

pub use kind::NotificationKind;
pub use model::{NewNotification, Notification};
pub use seatdesk_core::types::Priority;

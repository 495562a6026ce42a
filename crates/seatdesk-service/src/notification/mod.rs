//! Notification creation and read-side operations.

pub mod service;

pub use service::NotificationService;

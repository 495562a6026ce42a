//! PostgreSQL store implementations.

pub mod booking;
pub mod notification;
pub mod payment;
pub mod subscription;

pub use booking::BookingRepository;
pub use notification::NotificationRepository;
pub use payment::PaymentRepository;
pub use subscription::SubscriptionRepository;

use seatdesk_core::error::{AppError, ErrorKind};

/// Map a sqlx error, turning unique violations into `Conflict`.
pub(crate) fn map_write_error(context: &str, err: sqlx::Error) -> AppError {
    let unique = err
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        AppError::with_source(ErrorKind::Conflict, format!("{context}: duplicate"), err)
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), err)
    }
}

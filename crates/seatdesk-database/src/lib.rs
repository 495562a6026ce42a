//! # seatdesk-database
//!
//! Persistence for SeatDesk: the store traits the services depend on,
//! PostgreSQL implementations backed by `sqlx`, and in-memory
//! implementations for single-node use and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{BookingStore, NotificationFilter, NotificationStore, PaymentStore, SubscriptionStore};

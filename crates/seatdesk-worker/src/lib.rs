//! Background scheduling for SeatDesk.
//!
//! This crate provides:
//! - A dispatcher that hands due notifications to a delivery channel
//! - The daily subscription expiry check
//! - The scheduler loop and its start/stop lifecycle handle

pub mod delivery;
pub mod dispatch;
pub mod jobs;
pub mod runner;
pub mod scheduler;

pub use delivery::{LogDelivery, NotificationDelivery};
pub use dispatch::{DispatchReport, NotificationDispatcher};
pub use jobs::{ExpiryReport, SubscriptionExpiryCheck};
pub use runner::SchedulerRunner;
pub use scheduler::NotificationScheduler;

//! Reminder scheduling policy.

pub mod policy;

pub use policy::{ReminderPolicy, ReminderTarget};

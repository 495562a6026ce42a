//! Shared value types used across SeatDesk crates.

pub mod contact;
pub mod id;
pub mod lead_interval;
pub mod pagination;
pub mod priority;

pub use contact::{ContactInfo, SubscriptionPlan};
pub use id::{
    AccountId, BookingId, ExamId, LibraryId, NotificationId, OrderId, RecipientId,
    SubscriptionId, TaskId,
};
pub use lead_interval::LeadInterval;
pub use pagination::{PageRequest, PageResponse};
pub use priority::Priority;

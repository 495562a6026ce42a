//! In-memory stores for single-node deployments and tests.
//!
//! Each store is a `DashMap` behind an `Arc`, so clones share state.
//! Compare-and-set updates hold the map's shard lock for the key while
//! checking and writing.

pub mod booking;
pub mod notification;
pub mod payment;
pub mod subscription;

pub use booking::MemoryBookingStore;
pub use notification::MemoryNotificationStore;
pub use payment::MemoryPaymentStore;
pub use subscription::MemorySubscriptionStore;

//! Store traits the services depend on.
//!
//! Every state-changing update is a compare-and-set against the status
//! the caller read, so a concurrent writer surfaces as
//! [`ErrorKind::Conflict`](seatdesk_core::ErrorKind::Conflict) rather than
//! a lost update. Reads take no locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use seatdesk_core::result::AppResult;
use seatdesk_core::types::{
    BookingId, LibraryId, NotificationId, OrderId, PageRequest, PageResponse, RecipientId,
};
use seatdesk_entity::booking::{Booking, BookingStatus};
use seatdesk_entity::notification::{Notification, NotificationKind};
use seatdesk_entity::payment::{Payment, PaymentStatus};
use seatdesk_entity::subscription::SubscriptionRecord;

/// Persistence for bookings.
#[async_trait]
pub trait BookingStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new booking.
    async fn insert(&self, booking: &Booking) -> AppResult<()>;

    /// Fetch a booking by id.
    async fn get(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Replace a booking, provided its stored status is still `expected`.
    async fn update(&self, booking: &Booking, expected: BookingStatus) -> AppResult<()>;

    /// Seat-occupying bookings in a library whose window overlaps
    /// `[start, end)`.
    async fn find_occupying(
        &self,
        library_id: LibraryId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>>;
}

/// Persistence for payment orders.
#[async_trait]
pub trait PaymentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new order.
    async fn insert(&self, payment: &Payment) -> AppResult<()>;

    /// Fetch an order by id.
    async fn get(&self, order_id: &OrderId) -> AppResult<Option<Payment>>;

    /// The order for a booking still awaiting a callback, if any.
    async fn find_open(&self, booking_id: BookingId) -> AppResult<Option<Payment>>;

    /// The verified order for a booking, if any.
    async fn find_verified(&self, booking_id: BookingId) -> AppResult<Option<Payment>>;

    /// Replace an order, provided its stored status is still `expected`.
    /// Fails with `Conflict` if this would leave two verified orders for
    /// one booking.
    async fn update(&self, payment: &Payment, expected: PaymentStatus) -> AppResult<()>;
}

/// Filters for listing a recipient's notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationFilter {
    /// Only this kind.
    pub kind: Option<NotificationKind>,
    /// Only unread notifications.
    pub unread_only: bool,
}

impl NotificationFilter {
    /// Whether `notification` passes the filter.
    pub fn matches(&self, notification: &Notification) -> bool {
        self.kind.is_none_or(|kind| notification.kind == kind)
            && (!self.unread_only || !notification.read)
    }
}

/// Persistence for notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a batch of notifications atomically.
    async fn insert_many(&self, notifications: &[Notification]) -> AppResult<()>;

    /// Fetch a notification by id.
    async fn get(&self, id: NotificationId) -> AppResult<Option<Notification>>;

    /// Unsent notifications with `scheduled_for <= now`. Rows that never
    /// failed come first, oldest schedule first; failed rows follow, least
    /// recently failed first.
    async fn list_due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<Notification>>;

    /// Set `sent_at` if it is still unset. Returns whether this call set it.
    async fn mark_sent(&self, id: NotificationId, at: DateTime<Utc>) -> AppResult<bool>;

    /// Record a failed dispatch attempt on an unsent notification.
    async fn mark_failed(&self, id: NotificationId, at: DateTime<Utc>) -> AppResult<()>;

    /// Every notification related to a booking, oldest first.
    async fn list_for_booking(&self, booking_id: BookingId) -> AppResult<Vec<Notification>>;

    /// Mark one of the recipient's notifications read. Returns whether a
    /// row matched.
    async fn mark_read(&self, id: NotificationId, recipient_id: RecipientId) -> AppResult<bool>;

    /// Mark every unread notification of the recipient read.
    async fn mark_all_read(&self, recipient_id: RecipientId) -> AppResult<u64>;

    /// Page through a recipient's notifications, newest schedule first.
    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        filter: NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Count the recipient's unread notifications.
    async fn count_unread(&self, recipient_id: RecipientId) -> AppResult<u64>;
}

/// Persistence for provisioning records.
#[async_trait]
pub trait SubscriptionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a record. Fails with `Conflict` if the booking already has one.
    async fn insert(&self, record: &SubscriptionRecord) -> AppResult<()>;

    /// Fetch the record for a booking.
    async fn get(&self, booking_id: BookingId) -> AppResult<Option<SubscriptionRecord>>;

    /// Active subscriptions whose term ends at or before `cutoff`.
    async fn list_active_ending_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<SubscriptionRecord>>;

    /// Replace a record.
    async fn update(&self, record: &SubscriptionRecord) -> AppResult<()>;
}

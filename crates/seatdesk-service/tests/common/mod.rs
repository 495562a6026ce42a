//! Shared harness for service integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use seatdesk_core::config::{PaymentConfig, ReminderConfig, SubscriptionConfig};
use seatdesk_core::error::AppError;
use seatdesk_core::result::AppResult;
use seatdesk_core::traits::{ManualClock, ProvisioningBackend, StaticLibraryDirectory};
use seatdesk_core::types::{
    AccountId, BookingId, ContactInfo, LibraryId, NotificationId, OrderId, PageRequest,
    PageResponse, RecipientId, SubscriptionId, SubscriptionPlan,
};
use seatdesk_database::memory::{
    MemoryBookingStore, MemoryNotificationStore, MemoryPaymentStore, MemorySubscriptionStore,
};
use seatdesk_database::{NotificationFilter, NotificationStore};
use seatdesk_entity::booking::{Booking, BookingRequest};
use seatdesk_entity::notification::Notification;
use seatdesk_service::{
    BookingLocks, BookingService, CheckoutCoordinator, EventBus, NotificationService,
    PaymentCallback, PaymentService, ProvisioningService, ReminderPolicy,
};

pub const SECRET: &str = "test_key_secret";

/// Provisioning backend that counts calls and can be slowed or failed.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub accounts: AtomicUsize,
    pub subscriptions: AtomicUsize,
    pub delay_ms: u64,
    pub fail_accounts: bool,
}

#[async_trait]
impl ProvisioningBackend for RecordingBackend {
    async fn create_account(&self, _contact: &ContactInfo) -> AppResult<AccountId> {
        if self.delay_ms > 0 {
            tokio::time::sleep(StdDuration::from_millis(self.delay_ms)).await;
        }
        if self.fail_accounts {
            return Err(AppError::external_service("account service unavailable"));
        }
        self.accounts.fetch_add(1, Ordering::SeqCst);
        Ok(AccountId::new())
    }

    async fn activate_subscription(
        &self,
        _account_id: AccountId,
        _plan: &SubscriptionPlan,
    ) -> AppResult<SubscriptionId> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        Ok(SubscriptionId::new())
    }
}

/// Memory notification store whose inserts can be made to fail.
#[derive(Debug, Default)]
pub struct FaultyNotificationStore {
    pub inner: MemoryNotificationStore,
    pub fail_inserts: AtomicBool,
}

impl FaultyNotificationStore {
    pub fn set_inserts_failing(&self, failing: bool) {
        self.fail_inserts.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationStore for FaultyNotificationStore {
    async fn insert_many(&self, notifications: &[Notification]) -> AppResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::database("notifications table is read-only"));
        }
        self.inner.insert_many(notifications).await
    }

    async fn get(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        self.inner.get(id).await
    }

    async fn list_due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<Notification>> {
        self.inner.list_due(now, limit).await
    }

    async fn mark_sent(&self, id: NotificationId, at: DateTime<Utc>) -> AppResult<bool> {
        self.inner.mark_sent(id, at).await
    }

    async fn mark_failed(&self, id: NotificationId, at: DateTime<Utc>) -> AppResult<()> {
        self.inner.mark_failed(id, at).await
    }

    async fn list_for_booking(&self, booking_id: BookingId) -> AppResult<Vec<Notification>> {
        self.inner.list_for_booking(booking_id).await
    }

    async fn mark_read(&self, id: NotificationId, recipient_id: RecipientId) -> AppResult<bool> {
        self.inner.mark_read(id, recipient_id).await
    }

    async fn mark_all_read(&self, recipient_id: RecipientId) -> AppResult<u64> {
        self.inner.mark_all_read(recipient_id).await
    }

    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        filter: NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.inner.list_for_recipient(recipient_id, filter, page).await
    }

    async fn count_unread(&self, recipient_id: RecipientId) -> AppResult<u64> {
        self.inner.count_unread(recipient_id).await
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap()
}

pub struct TestApp {
    pub clock: ManualClock,
    pub library_id: LibraryId,
    pub booking_store: MemoryBookingStore,
    pub payment_store: MemoryPaymentStore,
    pub notification_store: MemoryNotificationStore,
    pub store_faults: Arc<FaultyNotificationStore>,
    pub subscription_store: MemorySubscriptionStore,
    pub backend: Arc<RecordingBackend>,
    pub locks: BookingLocks,
    pub events: EventBus,
    pub bookings: BookingService,
    pub payments: PaymentService,
    pub notifications: NotificationService,
    pub provisioning: ProvisioningService,
    pub checkout: CheckoutCoordinator,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(2, None, RecordingBackend::default())
    }

    pub fn build(
        seats: u32,
        max_failed_verifications: Option<u32>,
        backend: RecordingBackend,
    ) -> Self {
        let clock = ManualClock::new(t0());
        let library_id = LibraryId::new();
        let booking_store = MemoryBookingStore::new();
        let payment_store = MemoryPaymentStore::new();
        let notification_store = MemoryNotificationStore::new();
        let store_faults = Arc::new(FaultyNotificationStore {
            inner: notification_store.clone(),
            ..FaultyNotificationStore::default()
        });
        let subscription_store = MemorySubscriptionStore::new();
        let backend = Arc::new(backend);
        let events = EventBus::default();
        let locks = BookingLocks::new();

        let payment_config = PaymentConfig {
            key_id: "rzp_test".to_string(),
            key_secret: SECRET.to_string(),
            currency: "INR".to_string(),
            order_id_prefix: "order_".to_string(),
            max_failed_verifications,
        };

        let payments = PaymentService::new(
            Arc::new(booking_store.clone()),
            Arc::new(payment_store.clone()),
            locks.clone(),
            payment_config,
            Arc::new(clock.clone()),
            events.clone(),
        );
        let bookings = BookingService::new(
            Arc::new(booking_store.clone()),
            Arc::new(StaticLibraryDirectory::new().with_library(library_id, seats)),
            payments.clone(),
            locks.clone(),
            Arc::new(clock.clone()),
            events.clone(),
            "INR",
        );
        let notifications = NotificationService::new(
            store_faults.clone(),
            ReminderPolicy::new(&ReminderConfig::default()),
            Arc::new(clock.clone()),
        );
        let provisioning = ProvisioningService::new(
            Arc::new(booking_store.clone()),
            Arc::new(payment_store.clone()),
            Arc::new(subscription_store.clone()),
            backend.clone(),
            notifications.clone(),
            locks.clone(),
            Arc::new(clock.clone()),
            events.clone(),
            SubscriptionConfig::default(),
        );
        let checkout = CheckoutCoordinator::new(payments.clone(), provisioning.clone());

        Self {
            clock,
            library_id,
            booking_store,
            payment_store,
            notification_store,
            store_faults,
            subscription_store,
            backend,
            locks,
            events,
            bookings,
            payments,
            notifications,
            provisioning,
            checkout,
        }
    }

    pub fn request(&self, seat: Option<&str>) -> BookingRequest {
        BookingRequest {
            contact: ContactInfo {
                name: "Meera Iyer".to_string(),
                email: "meera@example.com".to_string(),
                mobile: "9822222222".to_string(),
                address: Some("12 MG Road, Pune".to_string()),
            },
            library_id: self.library_id,
            seat_id: seat.map(str::to_string),
            starts_at: t0() + Duration::days(1),
            ends_at: t0() + Duration::days(31),
            subscription_months: 1,
            amount_due: 100_000,
            currency: None,
            purpose: Some("UPSC preparation".to_string()),
        }
    }

    /// Submit and approve a booking, returning it with its order id.
    pub async fn approved_booking(&self) -> (Booking, OrderId) {
        let booking = self.bookings.submit(self.request(None)).await.unwrap();
        let approval = self.bookings.approve(booking.id).await.unwrap();
        (approval.booking, approval.order.order_id)
    }

    /// A correctly signed callback for `order_id`.
    pub fn signed(&self, order_id: &OrderId, payment_id: &str) -> PaymentCallback {
        let signature = self
            .payments
            .verifier()
            .sign(order_id.as_str(), payment_id)
            .unwrap();
        PaymentCallback::new(order_id.clone(), payment_id, signature)
    }
}

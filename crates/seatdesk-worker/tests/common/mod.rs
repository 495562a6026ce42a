//! Shared harness for worker tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use seatdesk_core::config::{PaymentConfig, ReminderConfig, SchedulerConfig};
use seatdesk_core::error::AppError;
use seatdesk_core::result::AppResult;
use seatdesk_core::traits::{ManualClock, StaticLibraryDirectory};
use seatdesk_core::types::{
    AccountId, BookingId, ContactInfo, LibraryId, NotificationId, PageRequest, PageResponse,
    Priority, RecipientId, SubscriptionId,
};
use seatdesk_database::memory::{
    MemoryBookingStore, MemoryNotificationStore, MemoryPaymentStore, MemorySubscriptionStore,
};
use seatdesk_database::{BookingStore, NotificationFilter, NotificationStore, SubscriptionStore};
use seatdesk_entity::booking::{Booking, BookingRequest, BookingStatus};
use seatdesk_entity::notification::Notification;
use seatdesk_entity::subscription::{SubscriptionRecord, SubscriptionStatus};
use seatdesk_service::{
    BookingLocks, BookingService, EventBus, NotificationService, PaymentService, ReminderPolicy,
};
use seatdesk_worker::{
    NotificationDelivery, NotificationDispatcher, SchedulerRunner, SubscriptionExpiryCheck,
};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap()
}

/// Delivery that records successful sends and fails chosen titles.
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    pub delivered: Mutex<Vec<NotificationId>>,
    pub failing_titles: Mutex<HashSet<String>>,
    pub delay: Option<StdDuration>,
}

impl RecordingDelivery {
    pub fn delivered(&self) -> Vec<NotificationId> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn fail_title(&self, title: &str) {
        self.failing_titles.lock().unwrap().insert(title.to_string());
    }

    pub fn heal(&self) {
        self.failing_titles.lock().unwrap().clear();
    }
}

#[async_trait]
impl NotificationDelivery for RecordingDelivery {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_titles.lock().unwrap().contains(&notification.title) {
            return Err(AppError::dispatch_failure("mail relay refused"));
        }
        self.delivered.lock().unwrap().push(notification.id);
        Ok(())
    }
}

/// Memory notification store whose due query can be made to fail.
#[derive(Debug, Default)]
pub struct FaultyNotificationStore {
    pub inner: MemoryNotificationStore,
    pub fail_list_due: AtomicBool,
}

impl FaultyNotificationStore {
    pub fn set_list_due_failing(&self, failing: bool) {
        self.fail_list_due.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationStore for FaultyNotificationStore {
    async fn insert_many(&self, notifications: &[Notification]) -> AppResult<()> {
        self.inner.insert_many(notifications).await
    }

    async fn get(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        self.inner.get(id).await
    }

    async fn list_due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<Notification>> {
        if self.fail_list_due.load(Ordering::SeqCst) {
            return Err(AppError::database("connection reset by peer"));
        }
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

pub struct Harness {
    pub clock: ManualClock,
    pub library_id: LibraryId,
    pub booking_store: MemoryBookingStore,
    pub notification_store: MemoryNotificationStore,
    pub store_faults: Arc<FaultyNotificationStore>,
    pub subscription_store: MemorySubscriptionStore,
    pub bookings: BookingService,
    pub notifications: NotificationService,
    pub delivery: Arc<RecordingDelivery>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_delivery(RecordingDelivery::default())
    }

    pub fn with_delivery(delivery: RecordingDelivery) -> Self {
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
        let events = EventBus::default();
        let locks = BookingLocks::new();

        let payment_config = PaymentConfig {
            key_id: "rzp_test".to_string(),
            key_secret: "worker_secret".to_string(),
            currency: "INR".to_string(),
            order_id_prefix: "order_".to_string(),
            max_failed_verifications: None,
        };
        let payments = PaymentService::new(
            Arc::new(booking_store.clone()),
            Arc::new(payment_store),
            locks.clone(),
            payment_config,
            Arc::new(clock.clone()),
            events.clone(),
        );
        let bookings = BookingService::new(
            Arc::new(booking_store.clone()),
            Arc::new(StaticLibraryDirectory::new().with_library(library_id, 10)),
            payments,
            locks,
            Arc::new(clock.clone()),
            events,
            "INR",
        );
        let notifications = NotificationService::new(
            store_faults.clone(),
            ReminderPolicy::new(&ReminderConfig::default()),
            Arc::new(clock.clone()),
        );

        Self {
            clock,
            library_id,
            booking_store,
            notification_store,
            store_faults,
            subscription_store,
            bookings,
            notifications,
            delivery: Arc::new(delivery),
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            delivery_timeout_seconds: 10,
            ..SchedulerConfig::default()
        }
    }

    pub fn dispatcher(&self, config: &SchedulerConfig) -> NotificationDispatcher {
        NotificationDispatcher::new(self.notifications.clone(), self.delivery.clone(), config)
    }

    pub fn expiry_check(&self, warning_days: u32) -> SubscriptionExpiryCheck {
        SubscriptionExpiryCheck::new(
            Arc::new(self.subscription_store.clone()),
            self.bookings.clone(),
            self.notifications.clone(),
            Arc::new(self.clock.clone()),
            warning_days,
        )
    }

    pub fn runner(&self, config: SchedulerConfig) -> SchedulerRunner {
        SchedulerRunner::new(
            self.dispatcher(&config),
            self.expiry_check(config.expiry_warning_days),
            config,
            Arc::new(self.clock.clone()),
        )
    }

    /// A general notification due at `at`.
    pub async fn notify_at(&self, title: &str, at: DateTime<Utc>) -> Notification {
        self.notifications
            .create_general(
                RecipientId::new(),
                title,
                "Library closes early today",
                Priority::Medium,
                Some(at),
            )
            .await
            .unwrap()
    }

    /// An active booking with a provisioned subscription ending at `ends_at`.
    pub async fn active_subscription(&self, ends_at: DateTime<Utc>) -> SubscriptionRecord {
        let request = BookingRequest {
            contact: ContactInfo {
                name: "Arjun Rao".to_string(),
                email: "arjun@example.com".to_string(),
                mobile: "9811111111".to_string(),
                address: None,
            },
            library_id: self.library_id,
            seat_id: None,
            starts_at: ends_at - Duration::days(30),
            ends_at,
            subscription_months: 1,
            amount_due: 100_000,
            currency: None,
            purpose: None,
        };
        let mut booking = Booking::from_request(request, "INR", t0() - Duration::days(30));
        booking.status = BookingStatus::Active;
        self.booking_store.insert(&booking).await.unwrap();

        let record = SubscriptionRecord {
            booking_id: booking.id,
            account_id: AccountId::new(),
            subscription_id: SubscriptionId::new(),
            library_id: self.library_id,
            months: 1,
            starts_at: ends_at - Duration::days(30),
            ends_at,
            status: SubscriptionStatus::Active,
            last_warned_at: None,
            created_at: t0() - Duration::days(30),
            updated_at: t0() - Duration::days(30),
        };
        self.subscription_store.insert(&record).await.unwrap();
        record
    }
}

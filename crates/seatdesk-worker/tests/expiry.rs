mod common;

use chrono::Duration;

use seatdesk_core::types::Priority;
use seatdesk_database::{BookingStore, SubscriptionStore};
use seatdesk_entity::booking::BookingStatus;
use seatdesk_entity::notification::NotificationKind;
use seatdesk_entity::subscription::SubscriptionStatus;
use seatdesk_worker::ExpiryReport;

use common::{Harness, t0};

#[tokio::test]
async fn test_warns_once_per_day_inside_window() {
    let h = Harness::new();
    let record = h.active_subscription(t0() + Duration::days(3)).await;
    let check = h.expiry_check(5);

    let report = check.run().await.unwrap();
    assert_eq!(report.warned, 1);

    let notes = h.notification_store.all();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::System);
    assert_eq!(notes[0].priority, Priority::High);
    assert_eq!(notes[0].title, "Subscription Expires in 3 Days");
    assert_eq!(notes[0].recipient_id, record.recipient());
    assert_eq!(notes[0].related_booking_id, Some(record.booking_id));

    h.clock.advance(Duration::hours(2));
    assert_eq!(check.run().await.unwrap().warned, 0);
    assert_eq!(h.notification_store.all().len(), 1);

    h.clock.advance(Duration::days(1));
    assert_eq!(check.run().await.unwrap().warned, 1);
    assert_eq!(h.notification_store.all().len(), 2);
}

#[tokio::test]
async fn test_last_day_warning_is_urgent() {
    let h = Harness::new();
    h.active_subscription(t0() + Duration::hours(20)).await;

    h.expiry_check(5).run().await.unwrap();

    let notes = h.notification_store.all();
    assert_eq!(notes[0].priority, Priority::Urgent);
    assert_eq!(notes[0].title, "Subscription Expires Tomorrow!");
}

#[tokio::test]
async fn test_exactly_one_day_left_reads_tomorrow() {
    let h = Harness::new();
    h.active_subscription(t0() + Duration::days(1)).await;

    h.expiry_check(5).run().await.unwrap();

    let notes = h.notification_store.all();
    assert_eq!(notes[0].title, "Subscription Expires Tomorrow!");
    assert!(notes[0].message.contains("expires tomorrow"));
    assert!(!notes[0].message.contains("1 days"));
}

#[tokio::test]
async fn test_warning_message_counts_days() {
    let h = Harness::new();
    h.active_subscription(t0() + Duration::days(2)).await;

    h.expiry_check(5).run().await.unwrap();

    let notes = h.notification_store.all();
    assert_eq!(notes[0].title, "Subscription Expires in 2 Days");
    assert!(notes[0].message.contains("expires in 2 days"));
}

#[tokio::test]
async fn test_subscription_outside_window_is_left_alone() {
    let h = Harness::new();
    h.active_subscription(t0() + Duration::days(12)).await;

    let report = h.expiry_check(5).run().await.unwrap();

    assert_eq!(report.warned, 0);
    assert_eq!(report.expired, 0);
    assert!(h.notification_store.all().is_empty());
}

#[tokio::test]
async fn test_lapsed_subscription_expires_booking() {
    let h = Harness::new();
    let record = h.active_subscription(t0() - Duration::hours(1)).await;
    let check = h.expiry_check(5);

    let report = check.run().await.unwrap();
    assert_eq!(report.expired, 1);

    let stored = h.subscription_store.get(record.booking_id).await.unwrap().unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Expired);
    let booking = h.booking_store.get(record.booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Expired);

    let notes = h.notification_store.all();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Subscription Expired");
    assert_eq!(notes[0].priority, Priority::Urgent);

    // Expired records are no longer candidates.
    assert_eq!(check.run().await.unwrap(), ExpiryReport::default());
}

#[tokio::test]
async fn test_lapse_tolerates_booking_already_closed() {
    let h = Harness::new();
    let record = h.active_subscription(t0() - Duration::hours(1)).await;
    h.bookings.expire(record.booking_id).await.unwrap();

    let report = h.expiry_check(5).run().await.unwrap();

    assert_eq!(report.expired, 1);
    assert_eq!(report.failed, 0);
}

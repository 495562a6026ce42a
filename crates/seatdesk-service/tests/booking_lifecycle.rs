//! Booking state machine behaviour.

mod common;

use chrono::Duration;

use common::TestApp;
use seatdesk_core::ErrorKind;
use seatdesk_core::events::{BookingEvent, EventPayload};
use seatdesk_database::BookingStore;
use seatdesk_entity::booking::BookingStatus;
use seatdesk_entity::payment::PaymentStatus;

#[tokio::test]
async fn submit_stores_pending_booking() {
    let app = TestApp::new();
    let booking = app.bookings.submit(app.request(Some("B-4"))).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.currency, "INR");
    assert_eq!(app.bookings.get(booking.id).await.unwrap().seat_id.as_deref(), Some("B-4"));
}

#[tokio::test]
async fn submit_rejects_malformed_request() {
    let app = TestApp::new();
    let mut request = app.request(None);
    request.contact.email = "meera".to_string();

    let err = app.bookings.submit(request).await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));
}

#[tokio::test]
async fn submit_rejects_unknown_library() {
    let app = TestApp::new();
    let mut request = app.request(None);
    request.library_id = seatdesk_core::types::LibraryId::new();

    let err = app.bookings.submit(request).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn submit_rejects_taken_seat_and_full_library() {
    let app = TestApp::build(2, None, Default::default());

    let first = app.bookings.submit(app.request(Some("A-1"))).await.unwrap();
    app.bookings.approve(first.id).await.unwrap();

    let err = app.bookings.submit(app.request(Some("A-1"))).await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    let second = app.bookings.submit(app.request(Some("A-2"))).await.unwrap();
    app.bookings.approve(second.id).await.unwrap();

    let err = app.bookings.submit(app.request(None)).await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    let mut later = app.request(None);
    later.starts_at += Duration::days(60);
    later.ends_at += Duration::days(60);
    assert!(app.bookings.submit(later).await.is_ok());
}

#[tokio::test]
async fn approve_rechecks_seat_taken_since_submission() {
    let app = TestApp::new();
    let first = app.bookings.submit(app.request(Some("B-7"))).await.unwrap();
    let second = app.bookings.submit(app.request(Some("B-7"))).await.unwrap();

    app.bookings.approve(first.id).await.unwrap();
    let err = app.bookings.approve(second.id).await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    let stored = app.booking_store.get(second.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Pending);
    assert!(app.payment_store.for_booking(second.id).is_empty());
}

#[tokio::test]
async fn approve_fails_once_library_filled_up() {
    let app = TestApp::build(1, None, Default::default());
    let first = app.bookings.submit(app.request(None)).await.unwrap();
    let second = app.bookings.submit(app.request(None)).await.unwrap();

    app.bookings.approve(first.id).await.unwrap();
    let err = app.bookings.approve(second.id).await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));
    assert!(app.locks.is_empty());
}

#[tokio::test]
async fn approve_moves_to_payment_pending_with_order() {
    let app = TestApp::new();
    let mut events = app.events.subscribe();
    let booking = app.bookings.submit(app.request(None)).await.unwrap();

    let approval = app.bookings.approve(booking.id).await.unwrap();

    assert_eq!(approval.booking.status, BookingStatus::PaymentPending);
    assert_eq!(approval.booking.approved_at, Some(common::t0()));
    assert_eq!(approval.order.amount, 100_000);
    assert_eq!(approval.order.status, PaymentStatus::Created);
    assert_eq!(approval.order.receipt, format!("booking_{}", booking.id));
    assert_eq!(approval.order.notes["student_name"], "Meera Iyer");

    let mut approved_seen = false;
    while let Ok(event) = events.try_recv() {
        if let EventPayload::Booking(BookingEvent::Approved { order_id, .. }) = event.payload {
            assert_eq!(order_id, approval.order.order_id);
            approved_seen = true;
        }
    }
    assert!(approved_seen);
}

#[tokio::test]
async fn second_approve_is_invalid_and_changes_nothing() {
    let app = TestApp::new();
    let booking = app.bookings.submit(app.request(None)).await.unwrap();
    let approval = app.bookings.approve(booking.id).await.unwrap();
    let before = app.booking_store.get(booking.id).await.unwrap().unwrap();

    let err = app.bookings.approve(booking.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));

    let after = app.booking_store.get(booking.id).await.unwrap().unwrap();
    assert_eq!(after.status, before.status);
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(app.payment_store.for_booking(booking.id).len(), 1);
    assert_eq!(
        app.payment_store.for_booking(booking.id)[0].order_id,
        approval.order.order_id
    );
}

#[tokio::test]
async fn concurrent_approvals_issue_one_order() {
    let app = TestApp::new();
    let booking = app.bookings.submit(app.request(None)).await.unwrap();

    let (a, b) = tokio::join!(
        app.bookings.approve(booking.id),
        app.bookings.approve(booking.id)
    );
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    assert_eq!(app.payment_store.for_booking(booking.id).len(), 1);
}

#[tokio::test]
async fn reject_requires_pending_and_reason() {
    let app = TestApp::new();
    let booking = app.bookings.submit(app.request(None)).await.unwrap();

    let err = app.bookings.reject(booking.id, "  ").await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    let rejected = app.bookings.reject(booking.id, "No seats on weekends").await.unwrap();
    assert_eq!(rejected.status, BookingStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("No seats on weekends"));

    let err = app.bookings.approve(booking.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));
    let err = app.bookings.cancel(booking.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));
}

#[tokio::test]
async fn cancel_from_payment_pending_but_not_active() {
    let app = TestApp::new();
    let (booking, _) = app.approved_booking().await;

    let cancelled = app.bookings.cancel(booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.cancelled_at, Some(common::t0()));

    let (active, order_id) = app.approved_booking().await;
    app.checkout
        .verify_and_provision(&app.signed(&order_id, "pay_1"))
        .await
        .unwrap();
    let err = app.bookings.cancel(active.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));
    assert_eq!(app.bookings.get(active.id).await.unwrap().status, BookingStatus::Active);
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let app = TestApp::new();
    let id = seatdesk_core::types::BookingId::new();
    assert!(app.bookings.approve(id).await.unwrap_err().is(ErrorKind::NotFound));
    assert!(app.bookings.cancel(id).await.unwrap_err().is(ErrorKind::NotFound));
}

#[tokio::test]
async fn expire_only_from_active() {
    let app = TestApp::new();
    let (booking, order_id) = app.approved_booking().await;

    let err = app.bookings.expire(booking.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));

    app.checkout
        .verify_and_provision(&app.signed(&order_id, "pay_9"))
        .await
        .unwrap();
    let expired = app.bookings.expire(booking.id).await.unwrap();
    assert_eq!(expired.status, BookingStatus::Expired);
}

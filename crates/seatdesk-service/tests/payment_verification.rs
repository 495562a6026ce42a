//! Payment order issuance and callback verification.

mod common;

use common::{RecordingBackend, TestApp};
use seatdesk_core::ErrorKind;
use seatdesk_core::types::OrderId;
use seatdesk_database::{BookingStore, PaymentStore};
use seatdesk_entity::booking::BookingStatus;
use seatdesk_entity::payment::PaymentStatus;
use seatdesk_service::PaymentCallback;

#[tokio::test]
async fn create_order_is_idempotent_before_verification() {
    let app = TestApp::new();
    let (booking, order_id) = app.approved_booking().await;

    let first = app.payments.create_order(booking.id).await.unwrap();
    let second = app.payments.create_order(booking.id).await.unwrap();

    assert_eq!(first.order_id, order_id);
    assert_eq!(second.order_id, order_id);
    assert_eq!(app.payment_store.for_booking(booking.id).len(), 1);
}

#[tokio::test]
async fn create_order_requires_payment_pending() {
    let app = TestApp::new();
    let booking = app.bookings.submit(app.request(None)).await.unwrap();

    let err = app.payments.create_order(booking.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));
}

#[tokio::test]
async fn valid_signature_verifies_order() {
    let app = TestApp::new();
    let (booking, order_id) = app.approved_booking().await;

    let result = app.payments.verify(&app.signed(&order_id, "pay_A")).await.unwrap();

    assert_eq!(result.booking_id, booking.id);
    assert_eq!(result.external_payment_id, "pay_A");
    assert!(!result.already_verified);
    let stored = app.payment_store.get(&order_id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Verified);
}

#[tokio::test]
async fn flipped_bit_is_signature_mismatch_and_booking_stays_payable() {
    let app = TestApp::new();
    let (booking, order_id) = app.approved_booking().await;
    let good = app.signed(&order_id, "pay_B");

    let mut raw = hex::decode(&good.signature).unwrap();
    raw[7] ^= 0b0001_0000;
    let forged = PaymentCallback::new(order_id.clone(), "pay_B", hex::encode(raw));

    let err = app.payments.verify(&forged).await.unwrap_err();
    assert!(err.is(ErrorKind::SignatureMismatch));

    let payment = app.payment_store.get(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    let stored = app.booking_store.get(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::PaymentPending);
    assert_eq!(stored.failed_verifications, 1);

    // Retry with a fresh order.
    let retry = app.payments.create_order(booking.id).await.unwrap();
    assert_ne!(retry.order_id, order_id);
    assert!(app.payments.verify(&app.signed(&retry.order_id, "pay_C")).await.is_ok());
}

#[tokio::test]
async fn malformed_signature_fails_closed() {
    let app = TestApp::new();
    let (_, order_id) = app.approved_booking().await;

    let err = app
        .payments
        .verify(&PaymentCallback::new(order_id, "pay_D", "xyz"))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::SignatureMismatch));
}

#[tokio::test]
async fn reported_amount_mismatch_marks_failed() {
    let app = TestApp::new();
    let (booking, order_id) = app.approved_booking().await;

    let callback = app.signed(&order_id, "pay_E").with_amount(99_000, "INR");
    let err = app.payments.verify(&callback).await.unwrap_err();
    assert!(err.is(ErrorKind::AmountMismatch));

    let payment = app.payment_store.get(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert!(payment.failure_reason.is_some());
    assert_eq!(
        app.booking_store.get(booking.id).await.unwrap().unwrap().status,
        BookingStatus::PaymentPending
    );
}

#[tokio::test]
async fn duplicate_verification_returns_prior_result() {
    let app = TestApp::new();
    let (_, order_id) = app.approved_booking().await;
    let callback = app.signed(&order_id, "pay_F").with_amount(100_000, "inr");

    let first = app.payments.verify(&callback).await.unwrap();
    app.clock.advance(chrono::Duration::minutes(3));
    let second = app.payments.verify(&callback).await.unwrap();

    assert!(second.already_verified);
    assert_eq!(second.verified_at, first.verified_at);
    assert_eq!(second.order_id, first.order_id);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let app = TestApp::new();
    let err = app
        .payments
        .verify(&app.signed(&OrderId::from("order_missing"), "pay_G"))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn failure_limit_cancels_booking() {
    let app = TestApp::build(2, Some(2), RecordingBackend::default());
    let (booking, order_id) = app.approved_booking().await;

    let bad = PaymentCallback::new(order_id, "pay_H", "00");
    assert!(app.payments.verify(&bad).await.is_err());
    assert_eq!(
        app.bookings.get(booking.id).await.unwrap().status,
        BookingStatus::PaymentPending
    );

    let retry = app.payments.create_order(booking.id).await.unwrap();
    let bad = PaymentCallback::new(retry.order_id, "pay_I", "00");
    assert!(app.payments.verify(&bad).await.is_err());

    let stored = app.bookings.get(booking.id).await.unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert_eq!(stored.failed_verifications, 2);
    assert!(app.payments.create_order(booking.id).await.is_err());
}

#[tokio::test]
async fn verified_booking_gets_no_new_order_and_cannot_be_cancelled() {
    let app = TestApp::build(
        2,
        None,
        RecordingBackend {
            fail_accounts: true,
            ..Default::default()
        },
    );
    let (booking, order_id) = app.approved_booking().await;
    let err = app
        .checkout
        .verify_and_provision(&app.signed(&order_id, "pay_V1"))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::ExternalService));

    let err = app.payments.create_order(booking.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));
    assert_eq!(app.payment_store.for_booking(booking.id).len(), 1);

    let err = app.bookings.cancel(booking.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));

    let stored = app.booking_store.get(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::PaymentPending);
    let payment = app.payment_store.get(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Verified);
}

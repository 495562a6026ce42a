//! In-memory payment store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use seatdesk_core::error::AppError;
use seatdesk_core::result::AppResult;
use seatdesk_core::types::{BookingId, OrderId};
use seatdesk_entity::payment::{Payment, PaymentStatus};

use crate::store::PaymentStore;

/// Payment orders held in a concurrent map keyed by order id.
#[derive(Debug, Clone, Default)]
pub struct MemoryPaymentStore {
    payments: Arc<DashMap<OrderId, Payment>>,
}

impl MemoryPaymentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every order issued for a booking, oldest first.
    pub fn for_booking(&self, booking_id: BookingId) -> Vec<Payment> {
        let mut orders: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| p.booking_id == booking_id)
            .map(|p| p.clone())
            .collect();
        orders.sort_by_key(|p| p.created_at);
        orders
    }

    fn find_with_status(&self, booking_id: BookingId, status: PaymentStatus) -> Option<Payment> {
        self.payments
            .iter()
            .find(|p| p.booking_id == booking_id && p.status == status)
            .map(|p| p.clone())
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn insert(&self, payment: &Payment) -> AppResult<()> {
        match self.payments.entry(payment.order_id.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Order {} already exists",
                payment.order_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(payment.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, order_id: &OrderId) -> AppResult<Option<Payment>> {
        Ok(self.payments.get(order_id).map(|p| p.clone()))
    }

    async fn find_open(&self, booking_id: BookingId) -> AppResult<Option<Payment>> {
        Ok(self.find_with_status(booking_id, PaymentStatus::Created))
    }

    async fn find_verified(&self, booking_id: BookingId) -> AppResult<Option<Payment>> {
        Ok(self.find_with_status(booking_id, PaymentStatus::Verified))
    }

    async fn update(&self, payment: &Payment, expected: PaymentStatus) -> AppResult<()> {
        if payment.status == PaymentStatus::Verified {
            if let Some(other) = self.find_with_status(payment.booking_id, PaymentStatus::Verified) {
                if other.order_id != payment.order_id {
                    return Err(AppError::conflict(format!(
                        "Booking {} already has verified order {}",
                        payment.booking_id, other.order_id
                    )));
                }
            }
        }

        let mut stored = self
            .payments
            .get_mut(&payment.order_id)
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", payment.order_id)))?;
        if stored.status != expected {
            return Err(AppError::conflict(format!(
                "Order {} is {}, expected {expected}",
                payment.order_id, stored.status
            )));
        }
        *stored = payment.clone();
        Ok(())
    }
}

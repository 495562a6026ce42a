//! In-memory provisioning record store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use seatdesk_core::error::AppError;
use seatdesk_core::result::AppResult;
use seatdesk_core::types::BookingId;
use seatdesk_entity::subscription::{SubscriptionRecord, SubscriptionStatus};

use crate::store::SubscriptionStore;

/// Provisioning records keyed by booking id.
#[derive(Debug, Clone, Default)]
pub struct MemorySubscriptionStore {
    records: Arc<DashMap<BookingId, SubscriptionRecord>>,
}

impl MemorySubscriptionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn insert(&self, record: &SubscriptionRecord) -> AppResult<()> {
        match self.records.entry(record.booking_id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Booking {} is already provisioned",
                record.booking_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, booking_id: BookingId) -> AppResult<Option<SubscriptionRecord>> {
        Ok(self.records.get(&booking_id).map(|r| r.clone()))
    }

    async fn list_active_ending_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<SubscriptionRecord>> {
        let mut due: Vec<SubscriptionRecord> = self
            .records
            .iter()
            .filter(|r| r.status == SubscriptionStatus::Active && r.ends_at <= cutoff)
            .map(|r| r.clone())
            .collect();
        due.sort_by_key(|r| r.ends_at);
        Ok(due)
    }

    async fn update(&self, record: &SubscriptionRecord) -> AppResult<()> {
        let mut stored = self.records.get_mut(&record.booking_id).ok_or_else(|| {
            AppError::not_found(format!("No subscription for booking {}", record.booking_id))
        })?;
        *stored = record.clone();
        Ok(())
    }
}

//! In-memory booking store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use seatdesk_core::error::AppError;
use seatdesk_core::result::AppResult;
use seatdesk_core::types::{BookingId, LibraryId};
use seatdesk_entity::booking::{Booking, BookingStatus};

use crate::store::BookingStore;

/// Bookings held in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookingStore {
    bookings: Arc<DashMap<BookingId, Booking>>,
}

impl MemoryBookingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn insert(&self, booking: &Booking) -> AppResult<()> {
        match self.bookings.entry(booking.id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Booking {} already exists",
                booking.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(booking.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, id: BookingId) -> AppResult<Option<Booking>> {
        Ok(self.bookings.get(&id).map(|b| b.clone()))
    }

    async fn update(&self, booking: &Booking, expected: BookingStatus) -> AppResult<()> {
        let mut stored = self
            .bookings
            .get_mut(&booking.id)
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", booking.id)))?;
        if stored.status != expected {
            return Err(AppError::conflict(format!(
                "Booking {} is {}, expected {expected}",
                booking.id, stored.status
            )));
        }
        *stored = booking.clone();
        Ok(())
    }

    async fn find_occupying(
        &self,
        library_id: LibraryId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        Ok(self
            .bookings
            .iter()
            .filter(|b| {
                b.library_id == library_id && b.status.occupies_seat() && b.overlaps(start, end)
            })
            .map(|b| b.clone())
            .collect())
    }
}

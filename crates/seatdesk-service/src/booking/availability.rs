//! Seat availability for a requested window.

use chrono::{DateTime, Utc};

use seatdesk_core::error::AppError;
use seatdesk_core::result::AppResult;
use seatdesk_core::traits::LibraryDirectory;
use seatdesk_core::types::{BookingId, LibraryId};
use seatdesk_database::BookingStore;
use seatdesk_entity::booking::{Booking, BookingRequest};

/// The seat and window a booking wants to hold.
#[derive(Debug, Clone, Copy)]
pub struct SeatClaim<'a> {
    /// Library the seat belongs to.
    pub library_id: LibraryId,
    /// A specific seat, if one was requested.
    pub seat_id: Option<&'a str>,
    /// Start of the window.
    pub starts_at: DateTime<Utc>,
    /// End of the window.
    pub ends_at: DateTime<Utc>,
    /// The booking making the claim, ignored among occupants.
    pub claimant: Option<BookingId>,
}

impl<'a> From<&'a BookingRequest> for SeatClaim<'a> {
    fn from(request: &'a BookingRequest) -> Self {
        Self {
            library_id: request.library_id,
            seat_id: request.seat_id.as_deref(),
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            claimant: None,
        }
    }
}

impl<'a> From<&'a Booking> for SeatClaim<'a> {
    fn from(booking: &'a Booking) -> Self {
        Self {
            library_id: booking.library_id,
            seat_id: booking.seat_id.as_deref(),
            starts_at: booking.window_start,
            ends_at: booking.window_end,
            claimant: Some(booking.id),
        }
    }
}

/// Fail with `Validation` if the claim cannot be seated.
///
/// A claim is unavailable when the seat it names is held by an
/// overlapping booking, or when overlapping bookings already fill the
/// library. Only approved, payment-pending, and active bookings hold
/// seats.
pub async fn ensure_available(
    directory: &dyn LibraryDirectory,
    bookings: &dyn BookingStore,
    claim: SeatClaim<'_>,
) -> AppResult<()> {
    let capacity = directory
        .seat_capacity(claim.library_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Library {} not found", claim.library_id)))?;

    let occupying: Vec<Booking> = bookings
        .find_occupying(claim.library_id, claim.starts_at, claim.ends_at)
        .await?
        .into_iter()
        .filter(|b| Some(b.id) != claim.claimant)
        .collect();

    if let Some(seat) = claim.seat_id {
        if occupying.iter().any(|b| b.seat_id.as_deref() == Some(seat)) {
            return Err(AppError::validation(format!(
                "Seat {seat} is already booked for the requested window"
            )));
        }
    }

    if occupying.len() as u64 >= u64::from(capacity) {
        return Err(AppError::validation(format!(
            "No seats available in library {} for the requested window",
            claim.library_id
        )));
    }
    Ok(())
}

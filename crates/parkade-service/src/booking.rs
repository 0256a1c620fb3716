//! Booking and releasing spots on behalf of a caller.

use chrono::{DateTime, Utc};
use parkade_core::caller::Caller;
use parkade_core::error::ParkadeResult;
use parkade_core::models::reservation::{BookSpot, ReleaseReservation, Reservation};
use parkade_core::repository::{PaginatedResult, Pagination, ReservationRepository};
use tracing::info;
use uuid::Uuid;

/// Reservation engine facade.
///
/// Members may book and release for themselves; administrators may act
/// for anyone.
pub struct BookingService<R: ReservationRepository> {
    reservations: R,
}

impl<R: ReservationRepository> BookingService<R> {
    pub fn new(reservations: R) -> Self {
        Self { reservations }
    }

    /// Book `spot_id` for `vehicle_id` starting now. Returns the
    /// reservation id.
    pub async fn book(
        &self,
        caller: &Caller,
        spot_id: Uuid,
        vehicle_id: Uuid,
        user_id: Uuid,
    ) -> ParkadeResult<Uuid> {
        self.book_at(caller, spot_id, vehicle_id, user_id, Utc::now())
            .await
    }

    pub async fn book_at(
        &self,
        caller: &Caller,
        spot_id: Uuid,
        vehicle_id: Uuid,
        user_id: Uuid,
        parked_at: DateTime<Utc>,
    ) -> ParkadeResult<Uuid> {
        caller.require_self_or_admin(user_id)?;
        let reservation = self
            .reservations
            .book(BookSpot {
                spot_id,
                vehicle_id,
                user_id,
                parked_at,
            })
            .await?;
        Ok(reservation.id)
    }

    /// Release a reservation now. Returns the final cost.
    pub async fn release(&self, caller: &Caller, reservation_id: Uuid) -> ParkadeResult<f64> {
        self.release_at(caller, reservation_id, Utc::now()).await
    }

    pub async fn release_at(
        &self,
        caller: &Caller,
        reservation_id: Uuid,
        released_at: DateTime<Utc>,
    ) -> ParkadeResult<f64> {
        let reservation = self.reservations.get_by_id(reservation_id).await?;
        caller.require_self_or_admin(reservation.user_id)?;

        let receipt = self
            .reservations
            .release(ReleaseReservation {
                reservation_id,
                released_at,
            })
            .await?;

        if caller.user_id != reservation.user_id {
            info!(
                admin = %caller.user_id,
                %reservation_id,
                "Reservation released by administrator"
            );
        }
        Ok(receipt.cost)
    }

    pub async fn get_reservation(
        &self,
        caller: &Caller,
        reservation_id: Uuid,
    ) -> ParkadeResult<Reservation> {
        let reservation = self.reservations.get_by_id(reservation_id).await?;
        caller.require_self_or_admin(reservation.user_id)?;
        Ok(reservation)
    }

    pub async fn history_for_user(
        &self,
        caller: &Caller,
        user_id: Uuid,
    ) -> ParkadeResult<Vec<Reservation>> {
        caller.require_self_or_admin(user_id)?;
        self.reservations.list_by_user(user_id).await
    }

    pub async fn active_for_user(
        &self,
        caller: &Caller,
        user_id: Uuid,
    ) -> ParkadeResult<Vec<Reservation>> {
        caller.require_self_or_admin(user_id)?;
        self.reservations.list_active_by_user(user_id).await
    }

    pub async fn history_for_lot(
        &self,
        caller: &Caller,
        lot_id: Uuid,
    ) -> ParkadeResult<Vec<Reservation>> {
        caller.require_admin()?;
        self.reservations.list_by_lot(lot_id).await
    }

    pub async fn all_reservations(
        &self,
        caller: &Caller,
        pagination: Pagination,
    ) -> ParkadeResult<PaginatedResult<Reservation>> {
        caller.require_admin()?;
        self.reservations.list(pagination).await
    }
}

//! SurrealDB implementation of [`ReservationRepository`].
//!
//! Booking and release each change three records (spot, vehicle and
//! reservation). Preconditions are read while holding the store's write
//! gate and the writes are committed as one transaction.

use chrono::{DateTime, Utc};
use parkade_core::billing::parking_cost;
use parkade_core::error::{ParkadeError, ParkadeResult};
use parkade_core::models::lot::SpotStatus;
use parkade_core::models::reservation::{
    BookSpot, ReleaseReceipt, ReleaseReservation, Reservation, ReservationStatus,
};
use parkade_core::repository::{PaginatedResult, Pagination, ReservationRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};
use uuid::Uuid;

use super::lot::{find_lot, find_spot};
use super::vehicle::find_vehicle;
use super::{count_of, parse_uuid, record_exists};
use crate::connection::Store;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub(crate) struct ReservationRow {
    record_id: String,
    user_id: String,
    vehicle_id: String,
    spot_id: String,
    lot_id: String,
    spot_label: String,
    status: String,
    parked_at: DateTime<Utc>,
    released_at: Option<DateTime<Utc>>,
    cost: Option<f64>,
}

fn parse_status(s: &str) -> Result<ReservationStatus, DbError> {
    match s {
        "Active" => Ok(ReservationStatus::Active),
        "Released" => Ok(ReservationStatus::Released),
        other => Err(DbError::Decode(format!("unknown reservation status: {other}"))),
    }
}

impl ReservationRow {
    pub(crate) fn try_into_reservation(self) -> Result<Reservation, DbError> {
        Ok(Reservation {
            id: parse_uuid(&self.record_id, "reservation")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            vehicle_id: parse_uuid(&self.vehicle_id, "vehicle")?,
            spot_id: parse_uuid(&self.spot_id, "parking spot")?,
            lot_id: parse_uuid(&self.lot_id, "parking lot")?,
            spot_label: self.spot_label,
            status: parse_status(&self.status)?,
            parked_at: self.parked_at,
            released_at: self.released_at,
            cost: self.cost,
        })
    }
}

pub(crate) fn rows_to_reservations(rows: Vec<ReservationRow>) -> Result<Vec<Reservation>, DbError> {
    rows.into_iter()
        .map(ReservationRow::try_into_reservation)
        .collect()
}

/// SurrealDB implementation of the reservation engine.
#[derive(Clone)]
pub struct SurrealReservationRepository<C: Connection> {
    store: Store<C>,
}

impl<C: Connection> SurrealReservationRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        Self { store }
    }

    fn db(&self) -> &Surreal<C> {
        self.store.client()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Reservation>, DbError> {
        let mut result = self
            .db()
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('reservation', $id)")
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<ReservationRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(ReservationRow::try_into_reservation)
            .transpose()
    }

    async fn require(&self, id: Uuid) -> ParkadeResult<Reservation> {
        self.find(id)
            .await?
            .ok_or_else(|| ParkadeError::not_found("reservation", id))
    }

    /// Reservations matching `filter`, newest first. The filter refers to
    /// the bound id as `$id`.
    async fn list_where(&self, filter: &str, id: Uuid) -> ParkadeResult<Vec<Reservation>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM reservation \
             WHERE {filter} ORDER BY parked_at DESC"
        );
        let mut result = self
            .db()
            .query(&query)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<ReservationRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows_to_reservations(rows)?)
    }
}

impl<C: Connection> ReservationRepository for SurrealReservationRepository<C> {
    async fn book(&self, input: BookSpot) -> ParkadeResult<Reservation> {
        let _gate = self.store.write().await;

        let spot = match find_spot(self.db(), input.spot_id).await? {
            Some(spot) if spot.status == SpotStatus::Available => spot,
            Some(spot) => {
                return Err(ParkadeError::SpotUnavailable {
                    spot: format!("{} is occupied", spot.label),
                });
            }
            None => {
                return Err(ParkadeError::SpotUnavailable {
                    spot: format!("spot {} does not exist", input.spot_id),
                });
            }
        };

        if !record_exists(self.db(), "user", input.user_id).await? {
            return Err(ParkadeError::not_found("user", input.user_id));
        }

        let vehicle = find_vehicle(self.db(), input.vehicle_id)
            .await?
            .ok_or_else(|| ParkadeError::VehicleConflict {
                reason: format!("vehicle {} does not exist", input.vehicle_id),
            })?;
        if vehicle.user_id != input.user_id {
            return Err(ParkadeError::VehicleConflict {
                reason: format!("vehicle {} is not registered to this user", vehicle.plate),
            });
        }
        if vehicle.parked {
            return Err(ParkadeError::VehicleConflict {
                reason: format!("vehicle {} is already parked", vehicle.plate),
            });
        }

        let id = Uuid::new_v4();
        self.db()
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE type::record('parking_spot', $spot_id) SET \
                     status = 'Occupied', updated_at = time::now(); \
                 UPDATE type::record('vehicle', $vehicle_id) SET \
                     parked = true, updated_at = time::now(); \
                 CREATE type::record('reservation', $id) SET \
                     user_id = $user_id, \
                     vehicle_id = $vehicle_id, \
                     spot_id = $spot_id, \
                     lot_id = $lot_id, \
                     spot_label = $spot_label, \
                     status = 'Active', \
                     parked_at = $parked_at, \
                     released_at = NONE, \
                     cost = NONE; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("vehicle_id", input.vehicle_id.to_string()))
            .bind(("spot_id", spot.id.to_string()))
            .bind(("lot_id", spot.lot_id.to_string()))
            .bind(("spot_label", spot.label.clone()))
            .bind(("parked_at", input.parked_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(
            reservation_id = %id,
            spot = %spot.label,
            vehicle = %vehicle.plate,
            user_id = %input.user_id,
            "Spot booked"
        );
        self.require(id).await
    }

    async fn release(&self, input: ReleaseReservation) -> ParkadeResult<ReleaseReceipt> {
        let _gate = self.store.write().await;

        let reservation = self.require(input.reservation_id).await?;
        if !reservation.is_active() || reservation.released_at.is_some() {
            return Err(ParkadeError::AlreadyReleased {
                reservation_id: reservation.id,
            });
        }

        let lot = find_lot(self.db(), reservation.lot_id)
            .await?
            .ok_or_else(|| ParkadeError::not_found("parking lot", reservation.lot_id))?;
        let charge = parking_cost(reservation.parked_at, input.released_at, lot.price_per_hour)?;

        let vehicle_present = record_exists(self.db(), "vehicle", reservation.vehicle_id).await?;
        let vehicle_update = if vehicle_present {
            "UPDATE type::record('vehicle', $vehicle_id) SET \
                 parked = false, updated_at = time::now();"
        } else {
            ""
        };

        let query = format!(
            "BEGIN TRANSACTION; \
             UPDATE type::record('parking_spot', $spot_id) SET \
                 status = 'Available', updated_at = time::now(); \
             {vehicle_update} \
             UPDATE type::record('reservation', $id) SET \
                 status = 'Released', \
                 released_at = $released_at, \
                 cost = $cost; \
             COMMIT TRANSACTION;"
        );

        self.db()
            .query(&query)
            .bind(("id", reservation.id.to_string()))
            .bind(("spot_id", reservation.spot_id.to_string()))
            .bind(("vehicle_id", reservation.vehicle_id.to_string()))
            .bind(("released_at", input.released_at))
            .bind(("cost", charge.cost))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(
            reservation_id = %reservation.id,
            spot = %reservation.spot_label,
            billed_hours = charge.hours,
            cost = charge.cost,
            vehicle_present,
            "Reservation released"
        );

        Ok(ReleaseReceipt {
            reservation: self.require(reservation.id).await?,
            billed_hours: charge.hours,
            cost: charge.cost,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> ParkadeResult<Reservation> {
        debug!(reservation_id = %id, "Fetching reservation");
        self.require(id).await
    }

    async fn list_by_user(&self, user_id: Uuid) -> ParkadeResult<Vec<Reservation>> {
        self.list_where("user_id = $id", user_id).await
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> ParkadeResult<Vec<Reservation>> {
        self.list_where("user_id = $id AND status = 'Active'", user_id)
            .await
    }

    async fn list_by_lot(&self, lot_id: Uuid) -> ParkadeResult<Vec<Reservation>> {
        self.list_where("lot_id = $id", lot_id).await
    }

    async fn list(&self, pagination: Pagination) -> ParkadeResult<PaginatedResult<Reservation>> {
        let mut count_result = self
            .db()
            .query("SELECT count() AS total FROM reservation GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let total = count_of(count_result.take(0).map_err(DbError::from)?);

        let mut result = self
            .db()
            .query(
                "SELECT meta::id(id) AS record_id, * FROM reservation \
                 ORDER BY parked_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReservationRow> = result.take(0).map_err(DbError::from)?;
        Ok(PaginatedResult {
            items: rows_to_reservations(rows)?,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_rejects_unknown_values() {
        assert_eq!(parse_status("Active").ok(), Some(ReservationStatus::Active));
        assert_eq!(parse_status("Released").ok(), Some(ReservationStatus::Released));
        assert!(parse_status("Booked").is_err());
    }
}

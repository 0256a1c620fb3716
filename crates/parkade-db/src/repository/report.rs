//! SurrealDB implementation of [`ReportRepository`].
//!
//! Reports never take the write gate, so figures are an approximate
//! snapshot when mutations run concurrently. Sums and the daily series
//! are computed in Rust from the raw rows.

use std::collections::HashMap;

use chrono::NaiveDate;
use parkade_core::error::{ParkadeError, ParkadeResult};
use parkade_core::models::lot::SpotStatus;
use parkade_core::models::report::{
    AdminSummary, ProjectionMismatch, SERIES_DAYS, UserSummary, daily_series,
};
use parkade_core::models::reservation::Reservation;
use parkade_core::repository::ReportRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::lot::{LotRow, SpotRow};
use super::reservation::{ReservationRow, rows_to_reservations};
use super::vehicle::VehicleRow;
use super::{CountRow, count_of};
use crate::connection::Store;
use crate::error::DbError;

const ADMIN_RECENT: usize = 5;
const USER_RECENT: usize = 3;

#[derive(Debug, SurrealValue)]
struct NameRow {
    full_name: String,
}

/// Most frequently used lot. Ties go to the alphabetically first
/// location name.
fn favourite_lot<'a>(
    reservations: &[Reservation],
    names: &'a HashMap<Uuid, String>,
) -> Option<&'a str> {
    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for r in reservations {
        *counts.entry(r.lot_id).or_default() += 1;
    }
    counts
        .into_iter()
        .filter_map(|(lot_id, n)| names.get(&lot_id).map(|name| (n, name.as_str())))
        .max_by(|(a_n, a_name), (b_n, b_name)| a_n.cmp(b_n).then_with(|| b_name.cmp(a_name)))
        .map(|(_, name)| name)
}

fn total_cost(reservations: &[Reservation]) -> f64 {
    reservations.iter().filter_map(|r| r.cost).sum()
}

/// SurrealDB implementation of the reporting queries.
#[derive(Clone)]
pub struct SurrealReportRepository<C: Connection> {
    store: Store<C>,
}

impl<C: Connection> SurrealReportRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        Self { store }
    }

    fn db(&self) -> &Surreal<C> {
        self.store.client()
    }

    async fn count(&self, query: &str) -> Result<u64, DbError> {
        let mut result = self.db().query(query).await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(count_of(rows))
    }

    async fn reservations(&self, query: &str, id: Option<Uuid>) -> Result<Vec<Reservation>, DbError> {
        let mut builder = self.db().query(query);
        if let Some(id) = id {
            builder = builder.bind(("id", id.to_string()));
        }
        let mut result = builder.await?;
        let rows: Vec<ReservationRow> = result.take(0)?;
        rows_to_reservations(rows)
    }

    async fn lot_names(&self) -> Result<HashMap<Uuid, String>, DbError> {
        let mut result = self
            .db()
            .query("SELECT meta::id(id) AS record_id, * FROM parking_lot")
            .await?;
        let rows: Vec<LotRow> = result.take(0)?;
        rows.into_iter()
            .map(|row| row.try_into_lot().map(|lot| (lot.id, lot.location_name)))
            .collect()
    }
}

impl<C: Connection> ReportRepository for SurrealReportRepository<C> {
    async fn admin_summary(&self, today: NaiveDate) -> ParkadeResult<AdminSummary> {
        debug!(%today, "Building admin summary");

        let total_users = self.count("SELECT count() AS total FROM user GROUP ALL").await?;
        let total_lots = self
            .count("SELECT count() AS total FROM parking_lot GROUP ALL")
            .await?;
        let total_spots = self
            .count("SELECT count() AS total FROM parking_spot GROUP ALL")
            .await?;
        let booked_spots = self
            .count(
                "SELECT count() AS total FROM parking_spot \
                 WHERE status = 'Occupied' GROUP ALL",
            )
            .await?;

        let reservations = self
            .reservations(
                "SELECT meta::id(id) AS record_id, * FROM reservation ORDER BY parked_at DESC",
                None,
            )
            .await?;

        let daily = daily_series(
            today,
            SERIES_DAYS,
            reservations.iter().map(|r| (r.parked_at, r.cost)),
        );

        Ok(AdminSummary {
            total_users,
            total_lots,
            total_spots,
            total_reservations: reservations.len() as u64,
            booked_spots,
            vacant_spots: total_spots.saturating_sub(booked_spots),
            total_revenue: total_cost(&reservations),
            daily,
            recent_reservations: reservations.into_iter().take(ADMIN_RECENT).collect(),
        })
    }

    async fn user_summary(&self, user_id: Uuid, today: NaiveDate) -> ParkadeResult<UserSummary> {
        debug!(%user_id, %today, "Building user summary");

        let mut result = self
            .db()
            .query("SELECT full_name FROM type::record('user', $id)")
            .bind(("id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let names: Vec<NameRow> = result.take(0).map_err(DbError::from)?;
        let full_name = names
            .into_iter()
            .next()
            .map(|r| r.full_name)
            .ok_or_else(|| ParkadeError::not_found("user", user_id))?;

        let reservations = self
            .reservations(
                "SELECT meta::id(id) AS record_id, * FROM reservation \
                 WHERE user_id = $id ORDER BY parked_at DESC",
                Some(user_id),
            )
            .await?;

        let mut vehicles = self
            .db()
            .query("SELECT count() AS total FROM vehicle WHERE user_id = $id GROUP ALL")
            .bind(("id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let total_vehicles = count_of(vehicles.take(0).map_err(DbError::from)?);

        let lot_names = self.lot_names().await?;
        let favourite = favourite_lot(&reservations, &lot_names).map(str::to_string);

        let daily = daily_series(
            today,
            SERIES_DAYS,
            reservations.iter().map(|r| (r.parked_at, r.cost)),
        );

        Ok(UserSummary {
            user_id,
            full_name,
            total_bookings: reservations.len() as u64,
            active_bookings: reservations.iter().filter(|r| r.is_active()).count() as u64,
            total_vehicles,
            total_spent: total_cost(&reservations),
            favourite_lot: favourite,
            daily,
            recent_reservations: reservations.into_iter().take(USER_RECENT).collect(),
        })
    }

    async fn audit_projections(&self) -> ParkadeResult<Vec<ProjectionMismatch>> {
        let active = self
            .reservations(
                "SELECT meta::id(id) AS record_id, * FROM reservation WHERE status = 'Active'",
                None,
            )
            .await?;

        let mut by_spot: HashMap<Uuid, u64> = HashMap::new();
        let mut by_vehicle: HashMap<Uuid, u64> = HashMap::new();
        for r in &active {
            *by_spot.entry(r.spot_id).or_default() += 1;
            *by_vehicle.entry(r.vehicle_id).or_default() += 1;
        }

        let mut mismatches = Vec::new();

        let mut spots = self
            .db()
            .query("SELECT meta::id(id) AS record_id, * FROM parking_spot ORDER BY label ASC")
            .await
            .map_err(DbError::from)?;
        let spot_rows: Vec<SpotRow> = spots.take(0).map_err(DbError::from)?;
        for row in spot_rows {
            let spot = row.try_into_spot()?;
            let holders = by_spot.get(&spot.id).copied().unwrap_or(0);
            let occupied = spot.status == SpotStatus::Occupied;
            if occupied != (holders > 0) || holders > 1 {
                mismatches.push(ProjectionMismatch::Spot {
                    spot_id: spot.id,
                    label: spot.label,
                    occupied,
                    active_reservations: holders,
                });
            }
        }

        let mut vehicles = self
            .db()
            .query("SELECT meta::id(id) AS record_id, * FROM vehicle ORDER BY plate ASC")
            .await
            .map_err(DbError::from)?;
        let vehicle_rows: Vec<VehicleRow> = vehicles.take(0).map_err(DbError::from)?;
        for row in vehicle_rows {
            let vehicle = row.try_into_vehicle()?;
            let holders = by_vehicle.get(&vehicle.id).copied().unwrap_or(0);
            if vehicle.parked != (holders > 0) || holders > 1 {
                mismatches.push(ProjectionMismatch::Vehicle {
                    vehicle_id: vehicle.id,
                    plate: vehicle.plate,
                    parked: vehicle.parked,
                    active_reservations: holders,
                });
            }
        }

        debug!(mismatches = mismatches.len(), "Projection audit finished");
        Ok(mismatches)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use parkade_core::models::reservation::ReservationStatus;

    use super::*;

    fn reservation(lot_id: Uuid, cost: Option<f64>) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            spot_id: Uuid::new_v4(),
            lot_id,
            spot_label: "LOT1-S001".into(),
            status: if cost.is_some() {
                ReservationStatus::Released
            } else {
                ReservationStatus::Active
            },
            parked_at: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
            released_at: None,
            cost,
        }
    }

    #[test]
    fn favourite_lot_prefers_most_used() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let names = HashMap::from([(a, "Airport".to_string()), (b, "Beach".to_string())]);
        let history = vec![reservation(b, None), reservation(b, None), reservation(a, None)];
        assert_eq!(favourite_lot(&history, &names), Some("Beach"));
    }

    #[test]
    fn favourite_lot_tie_goes_to_first_name() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let names = HashMap::from([(a, "Zoo".to_string()), (b, "Mall".to_string())]);
        let history = vec![reservation(a, None), reservation(b, None)];
        assert_eq!(favourite_lot(&history, &names), Some("Mall"));
    }

    #[test]
    fn favourite_lot_is_none_without_history() {
        assert_eq!(favourite_lot(&[], &HashMap::new()), None);
    }

    #[test]
    fn open_reservations_do_not_count_towards_spend() {
        let lot = Uuid::new_v4();
        let history = vec![reservation(lot, Some(20.0)), reservation(lot, None), reservation(lot, Some(10.0))];
        assert_eq!(total_cost(&history), 30.0);
    }
}

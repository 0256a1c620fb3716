//! SurrealDB implementation of [`VehicleRepository`].

use chrono::{DateTime, Utc};
use parkade_core::error::{ParkadeError, ParkadeResult};
use parkade_core::models::vehicle::{CreateVehicle, UpdateVehicle, Vehicle};
use parkade_core::repository::VehicleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{parse_uuid, record_exists};
use crate::connection::Store;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub(crate) struct VehicleRow {
    record_id: String,
    user_id: String,
    plate: String,
    kind: String,
    parked: bool,
    added_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VehicleRow {
    pub(crate) fn try_into_vehicle(self) -> Result<Vehicle, DbError> {
        Ok(Vehicle {
            id: parse_uuid(&self.record_id, "vehicle")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            plate: self.plate,
            kind: self.kind,
            parked: self.parked,
            added_at: self.added_at,
            updated_at: self.updated_at,
        })
    }
}

/// Plates are compared case-insensitively and without surrounding
/// whitespace.
fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

/// Looks a vehicle up by id. Shared with the booking path.
pub(crate) async fn find_vehicle<C: Connection>(
    db: &Surreal<C>,
    id: Uuid,
) -> Result<Option<Vehicle>, DbError> {
    let mut result = db
        .query("SELECT meta::id(id) AS record_id, * FROM type::record('vehicle', $id)")
        .bind(("id", id.to_string()))
        .await?;
    let rows: Vec<VehicleRow> = result.take(0)?;
    rows.into_iter()
        .next()
        .map(VehicleRow::try_into_vehicle)
        .transpose()
}

/// SurrealDB implementation of the Vehicle repository.
#[derive(Clone)]
pub struct SurrealVehicleRepository<C: Connection> {
    store: Store<C>,
}

impl<C: Connection> SurrealVehicleRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        Self { store }
    }

    fn db(&self) -> &Surreal<C> {
        self.store.client()
    }

    async fn require(&self, id: Uuid) -> ParkadeResult<Vehicle> {
        find_vehicle(self.db(), id)
            .await?
            .ok_or_else(|| ParkadeError::not_found("vehicle", id))
    }

    async fn plate_owner(&self, plate: &str) -> Result<Option<Uuid>, DbError> {
        let mut result = self
            .db()
            .query("SELECT meta::id(id) AS record_id, * FROM vehicle WHERE plate = $plate")
            .bind(("plate", plate.to_string()))
            .await?;
        let rows: Vec<VehicleRow> = result.take(0)?;
        Ok(rows
            .into_iter()
            .next()
            .map(VehicleRow::try_into_vehicle)
            .transpose()?
            .map(|v| v.id))
    }

    async fn query_for_user(&self, query: &str, user_id: Uuid) -> ParkadeResult<Vec<Vehicle>> {
        let mut result = self
            .db()
            .query(query)
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<VehicleRow> = result.take(0).map_err(DbError::from)?;
        let vehicles = rows
            .into_iter()
            .map(VehicleRow::try_into_vehicle)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(vehicles)
    }
}

impl<C: Connection> VehicleRepository for SurrealVehicleRepository<C> {
    async fn create(&self, input: CreateVehicle) -> ParkadeResult<Vehicle> {
        let plate = normalize_plate(&input.plate);
        if plate.is_empty() {
            return Err(ParkadeError::validation("plate must not be empty"));
        }
        let kind = input.kind.trim().to_string();
        if kind.is_empty() {
            return Err(ParkadeError::validation("vehicle kind must not be empty"));
        }

        let _gate = self.store.write().await;

        if !record_exists(self.db(), "user", input.user_id).await? {
            return Err(ParkadeError::not_found("user", input.user_id));
        }

        if self.plate_owner(&plate).await?.is_some() {
            return Err(ParkadeError::AlreadyExists {
                entity: format!("vehicle with plate {plate}"),
            });
        }

        let id = Uuid::new_v4();
        self.db()
            .query(
                "CREATE type::record('vehicle', $id) SET \
                 user_id = $user_id, \
                 plate = $plate, \
                 kind = $kind, \
                 parked = false",
            )
            .bind(("id", id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("plate", plate.clone()))
            .bind(("kind", kind))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(vehicle_id = %id, user_id = %input.user_id, plate = %plate, "Vehicle added");
        self.require(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> ParkadeResult<Vehicle> {
        self.require(id).await
    }

    async fn update(&self, id: Uuid, input: UpdateVehicle) -> ParkadeResult<Vehicle> {
        let plate = input.plate.as_deref().map(normalize_plate);
        if plate.as_deref().is_some_and(str::is_empty) {
            return Err(ParkadeError::validation("plate must not be empty"));
        }
        let kind = input.kind.map(|k| k.trim().to_string());
        if kind.as_deref().is_some_and(str::is_empty) {
            return Err(ParkadeError::validation("vehicle kind must not be empty"));
        }

        let _gate = self.store.write().await;
        self.require(id).await?;

        if let Some(plate) = &plate {
            if let Some(owner) = self.plate_owner(plate).await? {
                if owner != id {
                    return Err(ParkadeError::AlreadyExists {
                        entity: format!("vehicle with plate {plate}"),
                    });
                }
            }
        }

        let mut sets = Vec::new();
        if plate.is_some() {
            sets.push("plate = $plate");
        }
        if kind.is_some() {
            sets.push("kind = $kind");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('vehicle', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db().query(&query).bind(("id", id.to_string()));
        if let Some(plate) = plate {
            builder = builder.bind(("plate", plate));
        }
        if let Some(kind) = kind {
            builder = builder.bind(("kind", kind));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.require(id).await
    }

    async fn delete(&self, id: Uuid) -> ParkadeResult<()> {
        let _gate = self.store.write().await;
        let vehicle = self.require(id).await?;

        if vehicle.parked {
            return Err(ParkadeError::VehicleConflict {
                reason: format!("vehicle {} is currently parked", vehicle.plate),
            });
        }

        self.db()
            .query("DELETE type::record('vehicle', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(vehicle_id = %id, "Vehicle deleted");
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> ParkadeResult<Vec<Vehicle>> {
        self.query_for_user(
            "SELECT meta::id(id) AS record_id, * FROM vehicle \
             WHERE user_id = $user_id ORDER BY added_at ASC",
            user_id,
        )
        .await
    }

    async fn list_available_by_user(&self, user_id: Uuid) -> ParkadeResult<Vec<Vehicle>> {
        self.query_for_user(
            "SELECT meta::id(id) AS record_id, * FROM vehicle \
             WHERE user_id = $user_id AND parked = false ORDER BY added_at ASC",
            user_id,
        )
        .await
    }
}

//! SurrealDB implementation of [`LotRepository`].
//!
//! A lot and its spot pool are always written together. Lot numbers come
//! from the `_sequence` table and are never reused, so spot labels stay
//! unique even after a lot is deleted.

use chrono::{DateTime, Utc};
use parkade_core::error::{ParkadeError, ParkadeResult};
use parkade_core::models::lot::{
    CreateLot, LotOccupancy, ParkingLot, ParkingSpot, ResizeOutcome, SpotStatus, UpdateLot,
    spot_label,
};
use parkade_core::repository::{LotRepository, PaginatedResult, Pagination};
use serde_json::json;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::user::{address_to_value, value_to_address};
use super::{count_of, parse_uuid};
use crate::connection::Store;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub(crate) struct LotRow {
    record_id: String,
    number: u64,
    location_name: String,
    address: serde_json::Value,
    price_per_hour: f64,
    max_spots: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct SpotRow {
    record_id: String,
    lot_id: String,
    seq: u32,
    label: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SequenceRow {
    current: u64,
}

pub(crate) fn parse_spot_status(s: &str) -> Result<SpotStatus, DbError> {
    match s {
        "Available" => Ok(SpotStatus::Available),
        "Occupied" => Ok(SpotStatus::Occupied),
        other => Err(DbError::Decode(format!("unknown spot status: {other}"))),
    }
}

impl LotRow {
    pub(crate) fn try_into_lot(self) -> Result<ParkingLot, DbError> {
        Ok(ParkingLot {
            id: parse_uuid(&self.record_id, "parking lot")?,
            number: self.number,
            location_name: self.location_name,
            address: value_to_address(self.address)?,
            price_per_hour: self.price_per_hour,
            max_spots: self.max_spots,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl SpotRow {
    pub(crate) fn try_into_spot(self) -> Result<ParkingSpot, DbError> {
        Ok(ParkingSpot {
            id: parse_uuid(&self.record_id, "parking spot")?,
            lot_id: parse_uuid(&self.lot_id, "parking lot")?,
            seq: self.seq,
            label: self.label,
            status: parse_spot_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub(crate) async fn find_lot<C: Connection>(
    db: &Surreal<C>,
    id: Uuid,
) -> Result<Option<ParkingLot>, DbError> {
    let mut result = db
        .query("SELECT meta::id(id) AS record_id, * FROM type::record('parking_lot', $id)")
        .bind(("id", id.to_string()))
        .await?;
    let rows: Vec<LotRow> = result.take(0)?;
    rows.into_iter().next().map(LotRow::try_into_lot).transpose()
}

pub(crate) async fn find_spot<C: Connection>(
    db: &Surreal<C>,
    id: Uuid,
) -> Result<Option<ParkingSpot>, DbError> {
    let mut result = db
        .query("SELECT meta::id(id) AS record_id, * FROM type::record('parking_spot', $id)")
        .bind(("id", id.to_string()))
        .await?;
    let rows: Vec<SpotRow> = result.take(0)?;
    rows.into_iter().next().map(SpotRow::try_into_spot).transpose()
}

async fn spots_of<C: Connection>(db: &Surreal<C>, lot_id: Uuid) -> Result<Vec<ParkingSpot>, DbError> {
    let mut result = db
        .query(
            "SELECT meta::id(id) AS record_id, * FROM parking_spot \
             WHERE lot_id = $lot_id ORDER BY seq ASC",
        )
        .bind(("lot_id", lot_id.to_string()))
        .await?;
    let rows: Vec<SpotRow> = result.take(0)?;
    rows.into_iter().map(SpotRow::try_into_spot).collect()
}

/// JSON payload consumed by the `FOR $spot IN $spots` loop.
fn new_spots(lot_number: u64, seqs: impl Iterator<Item = u32>) -> (Vec<String>, serde_json::Value) {
    let mut labels = Vec::new();
    let mut payload = Vec::new();
    for seq in seqs {
        let label = spot_label(lot_number, seq);
        payload.push(json!({
            "id": Uuid::new_v4().to_string(),
            "seq": seq,
            "label": label,
        }));
        labels.push(label);
    }
    (labels, serde_json::Value::Array(payload))
}

const CREATE_SPOTS: &str = "\
FOR $spot IN $spots { \
    CREATE type::record('parking_spot', $spot.id) SET \
        lot_id = $id, \
        seq = $spot.seq, \
        label = $spot.label, \
        status = 'Available'; \
};";

/// SurrealDB implementation of the parking lot repository.
#[derive(Clone)]
pub struct SurrealLotRepository<C: Connection> {
    store: Store<C>,
}

impl<C: Connection> SurrealLotRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        Self { store }
    }

    fn db(&self) -> &Surreal<C> {
        self.store.client()
    }

    async fn require(&self, id: Uuid) -> ParkadeResult<ParkingLot> {
        find_lot(self.db(), id)
            .await?
            .ok_or_else(|| ParkadeError::not_found("parking lot", id))
    }

    async fn next_lot_number(&self) -> Result<u64, DbError> {
        let mut result = self
            .db()
            .query("SELECT current FROM type::record('_sequence', 'parking_lot')")
            .await?;
        let rows: Vec<SequenceRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.current).unwrap_or(0) + 1)
    }
}

impl<C: Connection> LotRepository for SurrealLotRepository<C> {
    async fn create(&self, input: CreateLot) -> ParkadeResult<ParkingLot> {
        input.validate()?;
        let address = address_to_value(&input.address)?;

        let _gate = self.store.write().await;

        let number = self.next_lot_number().await?;
        let id = Uuid::new_v4();
        let (labels, spots) = new_spots(number, 1..=input.spot_count);

        let query = format!(
            "BEGIN TRANSACTION; \
             UPSERT type::record('_sequence', 'parking_lot') SET current = $number; \
             CREATE type::record('parking_lot', $id) SET \
                 number = $number, \
                 location_name = $location_name, \
                 address = $address, \
                 price_per_hour = $price_per_hour, \
                 max_spots = $max_spots; \
             {CREATE_SPOTS} \
             COMMIT TRANSACTION;"
        );

        self.db()
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("number", number))
            .bind(("location_name", input.location_name.trim().to_string()))
            .bind(("address", address))
            .bind(("price_per_hour", input.price_per_hour))
            .bind(("max_spots", input.spot_count))
            .bind(("spots", spots))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(
            lot_id = %id,
            lot_number = number,
            spots = labels.len(),
            "Parking lot created"
        );
        self.require(id).await
    }

    async fn update(&self, id: Uuid, input: UpdateLot) -> ParkadeResult<ResizeOutcome> {
        input.validate()?;
        let address = input.address.as_ref().map(address_to_value).transpose()?;

        let _gate = self.store.write().await;

        let lot = self.require(id).await?;
        let spots = spots_of(self.db(), id).await?;

        let current = spots.iter().map(|s| s.seq).max().unwrap_or(0);
        let target = input.spot_count.unwrap_or(current);
        let occupied = spots
            .iter()
            .filter(|s| s.status == SpotStatus::Occupied)
            .count() as u32;

        if target < occupied {
            warn!(lot_id = %id, target, occupied, "Resize below occupied count rejected");
            return Err(ParkadeError::Capacity {
                reason: format!(
                    "lot {} has {occupied} occupied spot(s), cannot shrink to {target}",
                    lot.number
                ),
            });
        }

        let removed_spots: Vec<&ParkingSpot> = spots.iter().filter(|s| s.seq > target).collect();
        let blocked: Vec<&str> = removed_spots
            .iter()
            .filter(|s| s.status == SpotStatus::Occupied)
            .map(|s| s.label.as_str())
            .collect();
        if !blocked.is_empty() {
            warn!(lot_id = %id, target, blocked = ?blocked, "Shrink would remove occupied spots");
            return Err(ParkadeError::Capacity {
                reason: format!(
                    "cannot shrink lot {} to {target}: occupied spot(s) {}",
                    lot.number,
                    blocked.join(", ")
                ),
            });
        }

        let removed: Vec<String> = removed_spots.iter().map(|s| s.label.clone()).collect();
        let removed_ids: Vec<serde_json::Value> = removed_spots
            .iter()
            .map(|s| serde_json::Value::String(s.id.to_string()))
            .collect();
        let (added, new_spot_payload) = new_spots(lot.number, current + 1..=target);

        let mut sets = Vec::new();
        if input.location_name.is_some() {
            sets.push("location_name = $location_name");
        }
        if address.is_some() {
            sets.push("address = $address");
        }
        if input.price_per_hour.is_some() {
            sets.push("price_per_hour = $price_per_hour");
        }
        sets.push("max_spots = $max_spots");
        sets.push("updated_at = time::now()");

        let mut statements = vec![
            "BEGIN TRANSACTION;".to_string(),
            format!(
                "UPDATE type::record('parking_lot', $id) SET {};",
                sets.join(", ")
            ),
        ];
        if !removed.is_empty() {
            statements.push("DELETE reservation WHERE spot_id IN $removed_ids;".into());
            statements.push("DELETE parking_spot WHERE lot_id = $id AND seq > $max_spots;".into());
        }
        if !added.is_empty() {
            statements.push(CREATE_SPOTS.into());
        }
        statements.push("COMMIT TRANSACTION;".into());
        let query = statements.join(" ");

        let mut builder = self
            .db()
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("max_spots", target))
            .bind(("removed_ids", serde_json::Value::Array(removed_ids)))
            .bind(("spots", new_spot_payload));
        if let Some(name) = input.location_name {
            builder = builder.bind(("location_name", name.trim().to_string()));
        }
        if let Some(address) = address {
            builder = builder.bind(("address", address));
        }
        if let Some(price) = input.price_per_hour {
            builder = builder.bind(("price_per_hour", price));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(
            lot_id = %id,
            max_spots = target,
            added = added.len(),
            removed = removed.len(),
            "Parking lot updated"
        );

        Ok(ResizeOutcome {
            lot: self.require(id).await?,
            added,
            removed,
        })
    }

    async fn delete(&self, id: Uuid) -> ParkadeResult<()> {
        let _gate = self.store.write().await;
        let lot = self.require(id).await?;

        let mut result = self
            .db()
            .query(
                "SELECT count() AS total FROM parking_spot \
                 WHERE lot_id = $id AND status = 'Occupied' GROUP ALL",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let occupied = count_of(result.take(0).map_err(DbError::from)?);
        if occupied > 0 {
            warn!(lot_id = %id, occupied, "Delete of occupied lot rejected");
            return Err(ParkadeError::Capacity {
                reason: format!("lot {} still has {occupied} occupied spot(s)", lot.number),
            });
        }

        self.db()
            .query(
                "BEGIN TRANSACTION; \
                 DELETE reservation WHERE lot_id = $id; \
                 DELETE parking_spot WHERE lot_id = $id; \
                 DELETE type::record('parking_lot', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(lot_id = %id, lot_number = lot.number, "Parking lot deleted");
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> ParkadeResult<ParkingLot> {
        debug!(lot_id = %id, "Fetching parking lot");
        self.require(id).await
    }

    async fn list(&self, pagination: Pagination) -> ParkadeResult<PaginatedResult<ParkingLot>> {
        let mut count_result = self
            .db()
            .query("SELECT count() AS total FROM parking_lot GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let total = count_of(count_result.take(0).map_err(DbError::from)?);

        let mut result = self
            .db()
            .query(
                "SELECT meta::id(id) AS record_id, * FROM parking_lot \
                 ORDER BY number ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LotRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(LotRow::try_into_lot)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_spots(&self, lot_id: Uuid) -> ParkadeResult<Vec<ParkingSpot>> {
        self.require(lot_id).await?;
        Ok(spots_of(self.db(), lot_id).await?)
    }

    async fn get_spot(&self, spot_id: Uuid) -> ParkadeResult<ParkingSpot> {
        find_spot(self.db(), spot_id)
            .await?
            .ok_or_else(|| ParkadeError::not_found("parking spot", spot_id))
    }

    async fn occupancy(&self, lot_id: Uuid) -> ParkadeResult<LotOccupancy> {
        self.require(lot_id).await?;
        let spots = spots_of(self.db(), lot_id).await?;
        let total = spots.len() as u32;
        let occupied = spots
            .iter()
            .filter(|s| s.status == SpotStatus::Occupied)
            .count() as u32;
        Ok(LotOccupancy {
            lot_id,
            total,
            occupied,
            available: total - occupied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_spots_continue_from_given_sequence() {
        let (labels, payload) = new_spots(4, 3..=5);
        assert_eq!(labels, vec!["LOT4-S003", "LOT4-S004", "LOT4-S005"]);
        let items = payload.as_array().cloned().unwrap_or_default();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["seq"], 3);
        assert_eq!(items[2]["label"], "LOT4-S005");
    }

    #[test]
    fn empty_range_yields_no_spots() {
        let (labels, payload) = new_spots(1, 3..=2);
        assert!(labels.is_empty());
        assert_eq!(payload, serde_json::Value::Array(vec![]));
    }

    #[test]
    fn spot_status_parsing() {
        assert_eq!(parse_spot_status("Occupied").ok(), Some(SpotStatus::Occupied));
        assert!(parse_spot_status("Reserved").is_err());
    }
}

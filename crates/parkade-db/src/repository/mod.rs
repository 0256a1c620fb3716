//! SurrealDB repository implementations.

mod lot;
mod report;
mod reservation;
mod user;
mod vehicle;

pub use lot::SurrealLotRepository;
pub use report::SurrealReportRepository;
pub use reservation::SurrealReservationRepository;
pub use user::SurrealUserRepository;
pub use vehicle::SurrealVehicleRepository;

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

/// `SELECT count() … GROUP ALL` yields no row at all when nothing matches.
pub(crate) fn count_of(rows: Vec<CountRow>) -> u64 {
    rows.first().map(|r| r.total).unwrap_or(0)
}

pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

#[derive(Debug, SurrealValue)]
struct IdRow {
    record_id: String,
}

/// True when `table:id` exists.
pub(crate) async fn record_exists<C: Connection>(
    db: &Surreal<C>,
    table: &str,
    id: Uuid,
) -> Result<bool, DbError> {
    let key = id.to_string();
    let mut result = db
        .query("SELECT meta::id(id) AS record_id FROM type::record($table, $id)")
        .bind(("table", table.to_string()))
        .bind(("id", key.clone()))
        .await?;
    let rows: Vec<IdRow> = result.take(0)?;
    Ok(rows.iter().any(|r| r.record_id == key))
}

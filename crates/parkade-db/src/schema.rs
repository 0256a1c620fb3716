//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Addresses are embedded in their
//! owner record as FLEXIBLE objects.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Sequences (monotonic counters, e.g. lot numbers)
-- =======================================================================
DEFINE TABLE _sequence SCHEMAFULL;
DEFINE FIELD current ON TABLE _sequence TYPE int;

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['Admin', 'Member'];
DEFINE FIELD full_name ON TABLE user TYPE string;
DEFINE FIELD address ON TABLE user TYPE option<object> FLEXIBLE;
DEFINE FIELD registered_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Vehicles (owned by a user)
-- =======================================================================
DEFINE TABLE vehicle SCHEMAFULL;
DEFINE FIELD user_id ON TABLE vehicle TYPE string;
DEFINE FIELD plate ON TABLE vehicle TYPE string;
DEFINE FIELD kind ON TABLE vehicle TYPE string;
DEFINE FIELD parked ON TABLE vehicle TYPE bool DEFAULT false;
DEFINE FIELD added_at ON TABLE vehicle TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE vehicle TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_vehicle_plate ON TABLE vehicle COLUMNS plate UNIQUE;
DEFINE INDEX idx_vehicle_user ON TABLE vehicle COLUMNS user_id;

-- =======================================================================
-- Parking lots
-- =======================================================================
DEFINE TABLE parking_lot SCHEMAFULL;
DEFINE FIELD number ON TABLE parking_lot TYPE int;
DEFINE FIELD location_name ON TABLE parking_lot TYPE string;
DEFINE FIELD address ON TABLE parking_lot TYPE object FLEXIBLE;
DEFINE FIELD price_per_hour ON TABLE parking_lot TYPE float \
    ASSERT $value > 0;
DEFINE FIELD max_spots ON TABLE parking_lot TYPE int \
    ASSERT $value > 0;
DEFINE FIELD created_at ON TABLE parking_lot TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE parking_lot TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_parking_lot_number ON TABLE parking_lot \
    COLUMNS number UNIQUE;

-- =======================================================================
-- Parking spots (owned by a lot)
-- =======================================================================
DEFINE TABLE parking_spot SCHEMAFULL;
DEFINE FIELD lot_id ON TABLE parking_spot TYPE string;
DEFINE FIELD seq ON TABLE parking_spot TYPE int;
DEFINE FIELD label ON TABLE parking_spot TYPE string;
DEFINE FIELD status ON TABLE parking_spot TYPE string \
    ASSERT $value IN ['Available', 'Occupied'];
DEFINE FIELD created_at ON TABLE parking_spot TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE parking_spot TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_parking_spot_lot_seq ON TABLE parking_spot \
    COLUMNS lot_id, seq UNIQUE;
DEFINE INDEX idx_parking_spot_label ON TABLE parking_spot \
    COLUMNS label UNIQUE;

-- =======================================================================
-- Reservations
-- =======================================================================
DEFINE TABLE reservation SCHEMAFULL;
DEFINE FIELD user_id ON TABLE reservation TYPE string;
DEFINE FIELD vehicle_id ON TABLE reservation TYPE string;
DEFINE FIELD spot_id ON TABLE reservation TYPE string;
DEFINE FIELD lot_id ON TABLE reservation TYPE string;
DEFINE FIELD spot_label ON TABLE reservation TYPE string;
DEFINE FIELD status ON TABLE reservation TYPE string \
    ASSERT $value IN ['Active', 'Released'];
DEFINE FIELD parked_at ON TABLE reservation TYPE datetime;
DEFINE FIELD released_at ON TABLE reservation TYPE option<datetime>;
DEFINE FIELD cost ON TABLE reservation TYPE option<float>;
DEFINE INDEX idx_reservation_user ON TABLE reservation COLUMNS user_id;
DEFINE INDEX idx_reservation_lot ON TABLE reservation COLUMNS lot_id;
DEFINE INDEX idx_reservation_spot ON TABLE reservation COLUMNS spot_id;
DEFINE INDEX idx_reservation_parked_at ON TABLE reservation \
    COLUMNS parked_at;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defines_every_table() {
        for table in [
            "_sequence",
            "user",
            "vehicle",
            "parking_lot",
            "parking_spot",
            "reservation",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}

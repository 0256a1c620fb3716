//! Database-specific error types and conversions.

use parkade_core::error::ParkadeError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed record: {0}")]
    Decode(String),
}

/// Missing records are detected by the repositories themselves, so every
/// database-layer failure surfaces as [`ParkadeError::Database`].
impl From<DbError> for ParkadeError {
    fn from(err: DbError) -> Self {
        ParkadeError::Database(err.to_string())
    }
}

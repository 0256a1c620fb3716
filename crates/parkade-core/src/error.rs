//! Error types for the Parkade system.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ParkadeError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Spot unavailable: {spot}")]
    SpotUnavailable { spot: String },

    #[error("Vehicle conflict: {reason}")]
    VehicleConflict { reason: String },

    #[error("Reservation {reservation_id} has already been released")]
    AlreadyReleased { reservation_id: Uuid },

    #[error("Capacity error: {reason}")]
    Capacity { reason: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParkadeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

pub type ParkadeResult<T> = Result<T, ParkadeError>;

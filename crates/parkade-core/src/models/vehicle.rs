//! Vehicle domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Registration plate, unique across all users.
    pub plate: String,
    /// Free-text category such as "Car" or "Bike". Not used for pricing.
    pub kind: String,
    /// Cached projection: true while an Active reservation holds this vehicle.
    pub parked: bool,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVehicle {
    pub user_id: Uuid,
    pub plate: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateVehicle {
    pub plate: Option<String>,
    pub kind: Option<String>,
}

//! Reservation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReservationStatus {
    Active,
    Released,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub spot_id: Uuid,
    pub lot_id: Uuid,
    /// Label of the spot at booking time, e.g. `LOT1-S001`.
    pub spot_label: String,
    pub status: ReservationStatus,
    pub parked_at: DateTime<Utc>,
    /// Set exactly once, on release.
    pub released_at: Option<DateTime<Utc>>,
    /// Final cost, `None` while Active.
    pub cost: Option<f64>,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

/// Input for booking a spot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSpot {
    pub spot_id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub parked_at: DateTime<Utc>,
}

/// Input for releasing an Active reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseReservation {
    pub reservation_id: Uuid,
    pub released_at: DateTime<Utc>,
}

/// Outcome of a successful release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseReceipt {
    pub reservation: Reservation,
    pub billed_hours: i64,
    pub cost: f64,
}

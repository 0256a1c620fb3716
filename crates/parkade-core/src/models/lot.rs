//! Parking lot and parking spot models.
//!
//! A lot owns a pool of spots numbered `1..=max_spots`. Spots are never
//! renumbered: growing a lot appends after the highest sequence number
//! and shrinking removes from the top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::address::Address;
use crate::error::{ParkadeError, ParkadeResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: Uuid,
    /// Monotonic lot number used in spot labels. Never reused.
    pub number: u64,
    pub location_name: String,
    pub address: Address,
    pub price_per_hour: f64,
    pub max_spots: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpotStatus {
    Available,
    Occupied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub id: Uuid,
    pub lot_id: Uuid,
    /// 1-based position within the lot.
    pub seq: u32,
    /// Stable label, e.g. `LOT1-S001`.
    pub label: String,
    /// Cached projection: Occupied while an Active reservation holds this spot.
    pub status: SpotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLot {
    pub location_name: String,
    pub address: Address,
    pub price_per_hour: f64,
    pub spot_count: u32,
}

/// Changes to an existing lot. `spot_count` resizes the spot pool; the
/// other fields are applied in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateLot {
    pub location_name: Option<String>,
    pub address: Option<Address>,
    pub price_per_hour: Option<f64>,
    pub spot_count: Option<u32>,
}

/// Result of a lot update: the lot as committed plus the labels of the
/// spots that were appended or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeOutcome {
    pub lot: ParkingLot,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LotOccupancy {
    pub lot_id: Uuid,
    pub total: u32,
    pub occupied: u32,
    pub available: u32,
}

/// Deterministic label for spot `seq` of lot `lot_number`.
pub fn spot_label(lot_number: u64, seq: u32) -> String {
    format!("LOT{lot_number}-S{seq:03}")
}

pub fn validate_price(price_per_hour: f64) -> ParkadeResult<()> {
    if price_per_hour.is_finite() && price_per_hour > 0.0 {
        Ok(())
    } else {
        Err(ParkadeError::validation(format!(
            "price per hour must be positive, got {price_per_hour}"
        )))
    }
}

pub fn validate_spot_count(spot_count: u32) -> ParkadeResult<()> {
    if spot_count == 0 {
        return Err(ParkadeError::validation("a lot needs at least one spot"));
    }
    Ok(())
}

impl CreateLot {
    pub fn validate(&self) -> ParkadeResult<()> {
        if self.location_name.trim().is_empty() {
            return Err(ParkadeError::validation("location name must not be empty"));
        }
        self.address.validate()?;
        validate_price(self.price_per_hour)?;
        validate_spot_count(self.spot_count)
    }
}

impl UpdateLot {
    /// Shorthand for an update that only changes the spot count.
    pub fn resize(spot_count: u32) -> Self {
        Self {
            spot_count: Some(spot_count),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ParkadeResult<()> {
        if let Some(name) = &self.location_name {
            if name.trim().is_empty() {
                return Err(ParkadeError::validation("location name must not be empty"));
            }
        }
        if let Some(address) = &self.address {
            address.validate()?;
        }
        if let Some(price) = self.price_per_hour {
            validate_price(price)?;
        }
        if let Some(count) = self.spot_count {
            validate_spot_count(count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_lot(price: f64, spots: u32) -> CreateLot {
        CreateLot {
            location_name: "Central".into(),
            address: Address::new("MG Road", "Bengaluru", "KA", "560001"),
            price_per_hour: price,
            spot_count: spots,
        }
    }

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(spot_label(1, 1), "LOT1-S001");
        assert_eq!(spot_label(12, 45), "LOT12-S045");
        assert_eq!(spot_label(3, 1200), "LOT3-S1200");
    }

    #[test]
    fn create_rejects_non_positive_price_and_empty_pool() {
        assert!(create_lot(10.0, 2).validate().is_ok());
        assert!(create_lot(0.0, 2).validate().is_err());
        assert!(create_lot(-5.0, 2).validate().is_err());
        assert!(create_lot(f64::NAN, 2).validate().is_err());
        assert!(create_lot(10.0, 0).validate().is_err());
    }

    #[test]
    fn update_validates_only_present_fields() {
        assert!(UpdateLot::default().validate().is_ok());
        assert!(UpdateLot::resize(0).validate().is_err());
        let update = UpdateLot {
            price_per_hour: Some(0.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}

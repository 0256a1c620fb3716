//! Lot administration and browsing.

use parkade_core::caller::Caller;
use parkade_core::error::ParkadeResult;
use parkade_core::models::lot::{
    CreateLot, LotOccupancy, ParkingLot, ParkingSpot, ResizeOutcome, UpdateLot,
};
use parkade_core::repository::{LotRepository, PaginatedResult, Pagination};
use tracing::debug;
use uuid::Uuid;

/// Lot capacity management. Mutations are restricted to administrators;
/// any authenticated caller may browse.
pub struct LotService<L: LotRepository> {
    lots: L,
}

impl<L: LotRepository> LotService<L> {
    pub fn new(lots: L) -> Self {
        Self { lots }
    }

    pub async fn create_lot(&self, caller: &Caller, input: CreateLot) -> ParkadeResult<ParkingLot> {
        caller.require_admin()?;
        self.lots.create(input).await
    }

    pub async fn update_lot(
        &self,
        caller: &Caller,
        lot_id: Uuid,
        input: UpdateLot,
    ) -> ParkadeResult<ResizeOutcome> {
        caller.require_admin()?;
        self.lots.update(lot_id, input).await
    }

    /// Grow or shrink the spot pool without touching other lot fields.
    pub async fn resize_lot(
        &self,
        caller: &Caller,
        lot_id: Uuid,
        spot_count: u32,
    ) -> ParkadeResult<ResizeOutcome> {
        self.update_lot(caller, lot_id, UpdateLot::resize(spot_count))
            .await
    }

    pub async fn delete_lot(&self, caller: &Caller, lot_id: Uuid) -> ParkadeResult<()> {
        caller.require_admin()?;
        self.lots.delete(lot_id).await
    }

    pub async fn get_lot(&self, caller: &Caller, lot_id: Uuid) -> ParkadeResult<ParkingLot> {
        debug!(caller = %caller.user_id, %lot_id, "get_lot");
        self.lots.get_by_id(lot_id).await
    }

    pub async fn list_lots(
        &self,
        caller: &Caller,
        pagination: Pagination,
    ) -> ParkadeResult<PaginatedResult<ParkingLot>> {
        debug!(caller = %caller.user_id, "list_lots");
        self.lots.list(pagination).await
    }

    pub async fn list_spots(&self, caller: &Caller, lot_id: Uuid) -> ParkadeResult<Vec<ParkingSpot>> {
        debug!(caller = %caller.user_id, %lot_id, "list_spots");
        self.lots.list_spots(lot_id).await
    }

    pub async fn get_spot(&self, caller: &Caller, spot_id: Uuid) -> ParkadeResult<ParkingSpot> {
        debug!(caller = %caller.user_id, %spot_id, "get_spot");
        self.lots.get_spot(spot_id).await
    }

    pub async fn occupancy(&self, caller: &Caller, lot_id: Uuid) -> ParkadeResult<LotOccupancy> {
        debug!(caller = %caller.user_id, %lot_id, "occupancy");
        self.lots.occupancy(lot_id).await
    }
}

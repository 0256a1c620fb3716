//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Mutating operations on lots,
//! spots, vehicles and reservations are atomic: on any error, no state
//! has changed.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::ParkadeResult;
use crate::models::{
    address::Address,
    lot::{CreateLot, LotOccupancy, ParkingLot, ParkingSpot, ResizeOutcome, UpdateLot},
    report::{AdminSummary, ProjectionMismatch, UserSummary},
    reservation::{BookSpot, ReleaseReceipt, ReleaseReservation, Reservation},
    user::{CreateUser, UpdateUser, User},
    vehicle::{CreateVehicle, UpdateVehicle, Vehicle},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = ParkadeResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ParkadeResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = ParkadeResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = ParkadeResult<User>> + Send;
    /// Creates or replaces the user's address.
    fn set_address(
        &self,
        id: Uuid,
        address: Address,
    ) -> impl Future<Output = ParkadeResult<User>> + Send;
    /// Hashes and stores a new password.
    fn set_password(
        &self,
        id: Uuid,
        password: &str,
    ) -> impl Future<Output = ParkadeResult<()>> + Send;
    /// Deletes the user with their reservations and vehicles. Refused
    /// while any of their reservations is Active.
    fn delete(&self, id: Uuid) -> impl Future<Output = ParkadeResult<()>> + Send;
    fn any_admin(&self) -> impl Future<Output = ParkadeResult<bool>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = ParkadeResult<PaginatedResult<User>>> + Send;
}

pub trait VehicleRepository: Send + Sync {
    fn create(&self, input: CreateVehicle) -> impl Future<Output = ParkadeResult<Vehicle>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ParkadeResult<Vehicle>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateVehicle,
    ) -> impl Future<Output = ParkadeResult<Vehicle>> + Send;
    /// Refused while the vehicle is parked.
    fn delete(&self, id: Uuid) -> impl Future<Output = ParkadeResult<()>> + Send;
    fn list_by_user(&self, user_id: Uuid)
    -> impl Future<Output = ParkadeResult<Vec<Vehicle>>> + Send;
    /// Vehicles of `user_id` that are not currently parked.
    fn list_available_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = ParkadeResult<Vec<Vehicle>>> + Send;
}

// ---------------------------------------------------------------------------
// Lot capacity manager
// ---------------------------------------------------------------------------

pub trait LotRepository: Send + Sync {
    /// Creates the lot together with its full pool of Available spots.
    fn create(&self, input: CreateLot) -> impl Future<Output = ParkadeResult<ParkingLot>> + Send;
    /// Applies field changes and resizes the spot pool atomically.
    fn update(
        &self,
        id: Uuid,
        input: UpdateLot,
    ) -> impl Future<Output = ParkadeResult<ResizeOutcome>> + Send;
    /// Deletes the lot, its spots and their reservations. Refused while
    /// any spot is Occupied.
    fn delete(&self, id: Uuid) -> impl Future<Output = ParkadeResult<()>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ParkadeResult<ParkingLot>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = ParkadeResult<PaginatedResult<ParkingLot>>> + Send;
    /// Spots of the lot ordered by sequence number.
    fn list_spots(&self, lot_id: Uuid)
    -> impl Future<Output = ParkadeResult<Vec<ParkingSpot>>> + Send;
    fn get_spot(&self, spot_id: Uuid) -> impl Future<Output = ParkadeResult<ParkingSpot>> + Send;
    fn occupancy(&self, lot_id: Uuid) -> impl Future<Output = ParkadeResult<LotOccupancy>> + Send;
}

// ---------------------------------------------------------------------------
// Reservation engine
// ---------------------------------------------------------------------------

pub trait ReservationRepository: Send + Sync {
    /// Occupies an Available spot with a vehicle that is not parked.
    fn book(&self, input: BookSpot) -> impl Future<Output = ParkadeResult<Reservation>> + Send;
    /// Finalizes an Active reservation and frees its spot and vehicle.
    fn release(
        &self,
        input: ReleaseReservation,
    ) -> impl Future<Output = ParkadeResult<ReleaseReceipt>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ParkadeResult<Reservation>> + Send;
    /// Reservations of a user, newest first.
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = ParkadeResult<Vec<Reservation>>> + Send;
    fn list_active_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = ParkadeResult<Vec<Reservation>>> + Send;
    /// Reservations made in a lot, newest first.
    fn list_by_lot(
        &self,
        lot_id: Uuid,
    ) -> impl Future<Output = ParkadeResult<Vec<Reservation>>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = ParkadeResult<PaginatedResult<Reservation>>> + Send;
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

pub trait ReportRepository: Send + Sync {
    fn admin_summary(
        &self,
        today: NaiveDate,
    ) -> impl Future<Output = ParkadeResult<AdminSummary>> + Send;
    fn user_summary(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> impl Future<Output = ParkadeResult<UserSummary>> + Send;
    /// Recomputes the cached spot and vehicle flags from Active
    /// reservations. An empty result means the projections agree.
    fn audit_projections(
        &self,
    ) -> impl Future<Output = ParkadeResult<Vec<ProjectionMismatch>>> + Send;
}

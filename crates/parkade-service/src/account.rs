//! Profile, address and vehicle management.

use parkade_core::caller::Caller;
use parkade_core::error::ParkadeResult;
use parkade_core::models::address::Address;
use parkade_core::models::user::{UpdateUser, User};
use parkade_core::models::vehicle::{CreateVehicle, UpdateVehicle, Vehicle};
use parkade_core::repository::{PaginatedResult, Pagination, UserRepository, VehicleRepository};
use uuid::Uuid;

/// Account owners manage their own profile and vehicles; administrators
/// may manage anyone's.
pub struct AccountService<U: UserRepository, V: VehicleRepository> {
    users: U,
    vehicles: V,
}

impl<U: UserRepository, V: VehicleRepository> AccountService<U, V> {
    pub fn new(users: U, vehicles: V) -> Self {
        Self { users, vehicles }
    }

    pub async fn get_profile(&self, caller: &Caller, user_id: Uuid) -> ParkadeResult<User> {
        caller.require_self_or_admin(user_id)?;
        self.users.get_by_id(user_id).await
    }

    pub async fn update_profile(
        &self,
        caller: &Caller,
        user_id: Uuid,
        input: UpdateUser,
    ) -> ParkadeResult<User> {
        caller.require_self_or_admin(user_id)?;
        self.users.update(user_id, input).await
    }

    pub async fn set_address(
        &self,
        caller: &Caller,
        user_id: Uuid,
        address: Address,
    ) -> ParkadeResult<User> {
        caller.require_self_or_admin(user_id)?;
        self.users.set_address(user_id, address).await
    }

    pub async fn delete_user(&self, caller: &Caller, user_id: Uuid) -> ParkadeResult<()> {
        caller.require_self_or_admin(user_id)?;
        self.users.delete(user_id).await
    }

    pub async fn list_users(
        &self,
        caller: &Caller,
        pagination: Pagination,
    ) -> ParkadeResult<PaginatedResult<User>> {
        caller.require_admin()?;
        self.users.list(pagination).await
    }

    pub async fn add_vehicle(&self, caller: &Caller, input: CreateVehicle) -> ParkadeResult<Vehicle> {
        caller.require_self_or_admin(input.user_id)?;
        self.vehicles.create(input).await
    }

    pub async fn update_vehicle(
        &self,
        caller: &Caller,
        vehicle_id: Uuid,
        input: UpdateVehicle,
    ) -> ParkadeResult<Vehicle> {
        let vehicle = self.vehicles.get_by_id(vehicle_id).await?;
        caller.require_self_or_admin(vehicle.user_id)?;
        self.vehicles.update(vehicle_id, input).await
    }

    pub async fn delete_vehicle(&self, caller: &Caller, vehicle_id: Uuid) -> ParkadeResult<()> {
        let vehicle = self.vehicles.get_by_id(vehicle_id).await?;
        caller.require_self_or_admin(vehicle.user_id)?;
        self.vehicles.delete(vehicle_id).await
    }

    pub async fn list_vehicles(&self, caller: &Caller, user_id: Uuid) -> ParkadeResult<Vec<Vehicle>> {
        caller.require_self_or_admin(user_id)?;
        self.vehicles.list_by_user(user_id).await
    }

    /// Vehicles that can be booked right now.
    pub async fn list_available_vehicles(
        &self,
        caller: &Caller,
        user_id: Uuid,
    ) -> ParkadeResult<Vec<Vehicle>> {
        caller.require_self_or_admin(user_id)?;
        self.vehicles.list_available_by_user(user_id).await
    }
}

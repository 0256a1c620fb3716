//! Integration tests for the user and vehicle repositories using in-memory
//! SurrealDB.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use chrono::Utc;
use parkade_core::error::ParkadeError;
use parkade_core::models::address::Address;
use parkade_core::models::lot::CreateLot;
use parkade_core::models::reservation::{BookSpot, ReleaseReservation};
use parkade_core::models::user::{CreateUser, Role, UpdateUser};
use parkade_core::models::vehicle::{CreateVehicle, UpdateVehicle};
use parkade_core::repository::{
    LotRepository, Pagination, ReservationRepository, UserRepository, VehicleRepository,
};
use parkade_db::Store;
use parkade_db::repository::{
    SurrealLotRepository, SurrealReservationRepository, SurrealUserRepository,
    SurrealVehicleRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> Store<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    parkade_db::run_migrations(&db).await.unwrap();
    Store::new(db)
}

/// Checks `password` against a stored hash, prepending `pepper` the way
/// the repository does when it hashes.
fn verifies(password: &str, hash: &str, pepper: &str) -> bool {
    let parsed = PasswordHash::new(hash).unwrap();
    Argon2::default()
        .verify_password(format!("{pepper}{password}").as_bytes(), &parsed)
        .is_ok()
}

fn member(email: &str) -> CreateUser {
    CreateUser {
        email: email.into(),
        password: "hunter22".into(),
        full_name: "Test Member".into(),
        role: Role::Member,
    }
}

#[tokio::test]
async fn create_user_hashes_password() {
    let store = setup().await;
    let repo = SurrealUserRepository::new(store);

    let user = repo.create(member("Alice@Example.com ")).await.unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, Role::Member);
    assert!(user.address.is_none());
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert!(verifies("hunter22", &user.password_hash, ""));
    assert!(!verifies("wrong", &user.password_hash, ""));

    let by_email = repo.get_by_email("ALICE@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn pepper_is_required_to_verify() {
    let store = setup().await;
    let repo = SurrealUserRepository::with_pepper(store, "pepper".into());

    let user = repo.create(member("p@example.com")).await.unwrap();
    assert!(verifies("hunter22", &user.password_hash, "pepper"));
    assert!(!verifies("hunter22", &user.password_hash, ""));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let store = setup().await;
    let repo = SurrealUserRepository::new(store);

    repo.create(member("dup@example.com")).await.unwrap();
    let err = repo.create(member("DUP@example.com")).await.unwrap_err();
    assert!(matches!(err, ParkadeError::AlreadyExists { .. }));

    let other = repo.create(member("other@example.com")).await.unwrap();
    let err = repo
        .update(
            other.id,
            UpdateUser {
                email: Some("dup@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ParkadeError::AlreadyExists { .. }));
}

#[tokio::test]
async fn profile_address_and_password_updates() {
    let store = setup().await;
    let repo = SurrealUserRepository::new(store);
    let user = repo.create(member("bob@example.com")).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                full_name: Some("Bob Builder".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.full_name, "Bob Builder");
    assert_eq!(updated.email, "bob@example.com");

    let mut address = Address::new("Park Street", "Kolkata", "West Bengal", "700016");
    address.house_number = Some("12B".into());
    let with_address = repo.set_address(user.id, address.clone()).await.unwrap();
    assert_eq!(with_address.address, Some(address));

    let replaced = repo
        .set_address(user.id, Address::new("Ring Road", "Delhi", "Delhi", "110001"))
        .await
        .unwrap();
    assert_eq!(replaced.address.map(|a| a.city), Some("Delhi".to_string()));

    repo.set_password(user.id, "new-password").await.unwrap();
    let reloaded = repo.get_by_id(user.id).await.unwrap();
    assert!(verifies("new-password", &reloaded.password_hash, ""));
}

#[tokio::test]
async fn admin_detection_and_listing() {
    let store = setup().await;
    let repo = SurrealUserRepository::new(store);
    assert!(!repo.any_admin().await.unwrap());

    repo.create(member("m@example.com")).await.unwrap();
    assert!(!repo.any_admin().await.unwrap());

    repo.create(CreateUser {
        role: Role::Admin,
        ..member("admin@example.com")
    })
    .await
    .unwrap();
    assert!(repo.any_admin().await.unwrap());

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn vehicle_lifecycle() {
    let store = setup().await;
    let users = SurrealUserRepository::new(store.clone());
    let vehicles = SurrealVehicleRepository::new(store);
    let user = users.create(member("v@example.com")).await.unwrap();

    let car = vehicles
        .create(CreateVehicle {
            user_id: user.id,
            plate: " ka01ab1234 ".into(),
            kind: "Car".into(),
        })
        .await
        .unwrap();
    assert_eq!(car.plate, "KA01AB1234");
    assert!(!car.parked);

    let err = vehicles
        .create(CreateVehicle {
            user_id: user.id,
            plate: "KA01AB1234".into(),
            kind: "Bike".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ParkadeError::AlreadyExists { .. }));

    let err = vehicles
        .create(CreateVehicle {
            user_id: user.id,
            plate: "   ".into(),
            kind: "Car".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ParkadeError::Validation { .. }));

    let err = vehicles
        .create(CreateVehicle {
            user_id: uuid::Uuid::new_v4(),
            plate: "KA09ZZ0000".into(),
            kind: "Car".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ParkadeError::NotFound { .. }));

    let updated = vehicles
        .update(
            car.id,
            UpdateVehicle {
                kind: Some("SUV".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.kind, "SUV");
    assert_eq!(updated.plate, "KA01AB1234");

    assert_eq!(vehicles.list_by_user(user.id).await.unwrap().len(), 1);
    vehicles.delete(car.id).await.unwrap();
    assert!(vehicles.list_by_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn parked_vehicle_and_owner_cannot_be_deleted() {
    let store = setup().await;
    let users = SurrealUserRepository::new(store.clone());
    let vehicles = SurrealVehicleRepository::new(store.clone());
    let lots = SurrealLotRepository::new(store.clone());
    let reservations = SurrealReservationRepository::new(store);

    let user = users.create(member("parked@example.com")).await.unwrap();
    let car = vehicles
        .create(CreateVehicle {
            user_id: user.id,
            plate: "MH12AB0001".into(),
            kind: "Car".into(),
        })
        .await
        .unwrap();
    let spare = vehicles
        .create(CreateVehicle {
            user_id: user.id,
            plate: "MH12AB0002".into(),
            kind: "Bike".into(),
        })
        .await
        .unwrap();
    let lot = lots
        .create(CreateLot {
            location_name: "Station".into(),
            address: Address::new("Station Road", "Pune", "Maharashtra", "411001"),
            price_per_hour: 5.0,
            spot_count: 1,
        })
        .await
        .unwrap();
    let spot = lots.list_spots(lot.id).await.unwrap().remove(0);

    let reservation = reservations
        .book(BookSpot {
            spot_id: spot.id,
            vehicle_id: car.id,
            user_id: user.id,
            parked_at: Utc::now(),
        })
        .await
        .unwrap();

    let available = vehicles.list_available_by_user(user.id).await.unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, spare.id);

    let err = vehicles.delete(car.id).await.unwrap_err();
    assert!(matches!(err, ParkadeError::VehicleConflict { .. }));
    let err = users.delete(user.id).await.unwrap_err();
    assert!(matches!(err, ParkadeError::VehicleConflict { .. }));

    reservations
        .release(ReleaseReservation {
            reservation_id: reservation.id,
            released_at: Utc::now(),
        })
        .await
        .unwrap();

    users.delete(user.id).await.unwrap();
    assert!(matches!(
        users.get_by_id(user.id).await.unwrap_err(),
        ParkadeError::NotFound { .. }
    ));
    assert!(vehicles.list_by_user(user.id).await.unwrap().is_empty());
    assert!(reservations.list_by_user(user.id).await.unwrap().is_empty());
}

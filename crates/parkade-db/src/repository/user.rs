//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.
//!
//! Emails are stored trimmed and lower-cased so that uniqueness is
//! case-insensitive.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use parkade_core::error::{ParkadeError, ParkadeResult};
use parkade_core::models::address::Address;
use parkade_core::models::user::{CreateUser, Role, UpdateUser, User};
use parkade_core::repository::{PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{CountRow, count_of, parse_uuid};
use crate::connection::Store;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    email: String,
    password_hash: String,
    role: String,
    full_name: String,
    address: Option<serde_json::Value>,
    registered_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "Admin" => Ok(Role::Admin),
        "Member" => Ok(Role::Member),
        other => Err(DbError::Decode(format!("unknown user role: {other}"))),
    }
}

fn role_to_string(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin",
        Role::Member => "Member",
    }
}

pub(crate) fn address_to_value(address: &Address) -> Result<serde_json::Value, DbError> {
    serde_json::to_value(address).map_err(|e| DbError::Decode(format!("address encode: {e}")))
}

pub(crate) fn value_to_address(value: serde_json::Value) -> Result<Address, DbError> {
    serde_json::from_value(value).map_err(|e| DbError::Decode(format!("address decode: {e}")))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid(&self.record_id, "user")?,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            full_name: self.full_name,
            address: self.address.map(value_to_address).transpose()?,
            registered_at: self.registered_at,
            updated_at: self.updated_at,
        })
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Query(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Query(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    store: Store<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        Self {
            store,
            pepper: None,
        }
    }

    pub fn with_pepper(store: Store<C>, pepper: String) -> Self {
        Self {
            store,
            pepper: Some(pepper),
        }
    }

    fn db(&self) -> &Surreal<C> {
        self.store.client()
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, DbError> {
        let mut result = self
            .db()
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<UserRow> = result.take(0)?;
        rows.into_iter().next().map(UserRow::try_into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let mut result = self
            .db()
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", normalize_email(email)))
            .await?;
        let rows: Vec<UserRow> = result.take(0)?;
        rows.into_iter().next().map(UserRow::try_into_user).transpose()
    }

    async fn require(&self, id: Uuid) -> ParkadeResult<User> {
        self.find(id)
            .await?
            .ok_or_else(|| ParkadeError::not_found("user", id))
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> ParkadeResult<User> {
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(ParkadeError::validation("email must not be empty"));
        }
        if input.full_name.trim().is_empty() {
            return Err(ParkadeError::validation("full name must not be empty"));
        }

        let _gate = self.store.write().await;

        if self.find_by_email(&email).await?.is_some() {
            return Err(ParkadeError::AlreadyExists {
                entity: format!("user with email {email}"),
            });
        }

        let id = Uuid::new_v4();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        self.db()
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, \
                 password_hash = $password_hash, \
                 role = $role, \
                 full_name = $full_name, \
                 address = NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .bind(("role", role_to_string(input.role).to_string()))
            .bind(("full_name", input.full_name.trim().to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(user_id = %id, role = ?input.role, "User created");
        self.require(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> ParkadeResult<User> {
        self.require(id).await
    }

    async fn get_by_email(&self, email: &str) -> ParkadeResult<User> {
        self.find_by_email(email)
            .await?
            .ok_or_else(|| ParkadeError::not_found("user", format!("email={}", normalize_email(email))))
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> ParkadeResult<User> {
        if let Some(name) = &input.full_name {
            if name.trim().is_empty() {
                return Err(ParkadeError::validation("full name must not be empty"));
            }
        }

        let _gate = self.store.write().await;
        let existing = self.require(id).await?;

        let email = input.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            if email.is_empty() {
                return Err(ParkadeError::validation("email must not be empty"));
            }
            if *email != existing.email {
                if let Some(other) = self.find_by_email(email).await? {
                    if other.id != id {
                        return Err(ParkadeError::AlreadyExists {
                            entity: format!("user with email {email}"),
                        });
                    }
                }
            }
        }

        let mut sets = Vec::new();
        if email.is_some() {
            sets.push("email = $email");
        }
        if input.full_name.is_some() {
            sets.push("full_name = $full_name");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db().query(&query).bind(("id", id.to_string()));
        if let Some(email) = email {
            builder = builder.bind(("email", email));
        }
        if let Some(full_name) = input.full_name {
            builder = builder.bind(("full_name", full_name.trim().to_string()));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.require(id).await
    }

    async fn set_address(&self, id: Uuid, address: Address) -> ParkadeResult<User> {
        address.validate()?;
        let value = address_to_value(&address)?;

        let _gate = self.store.write().await;
        self.require(id).await?;

        self.db()
            .query(
                "UPDATE type::record('user', $id) SET \
                 address = $address, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("address", value))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.require(id).await
    }

    async fn set_password(&self, id: Uuid, password: &str) -> ParkadeResult<()> {
        let _gate = self.store.write().await;
        self.require(id).await?;

        let password_hash = hash_password(password, self.pepper.as_deref())?;
        self.db()
            .query(
                "UPDATE type::record('user', $id) SET \
                 password_hash = $password_hash, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> ParkadeResult<()> {
        let _gate = self.store.write().await;
        self.require(id).await?;

        let mut result = self
            .db()
            .query(
                "SELECT count() AS total FROM reservation \
                 WHERE user_id = $id AND status = 'Active' GROUP ALL",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let active = count_of(result.take(0).map_err(DbError::from)?);
        if active > 0 {
            return Err(ParkadeError::VehicleConflict {
                reason: format!("user {id} has {active} vehicle(s) currently parked"),
            });
        }

        // Explicit cascade: reservations, then vehicles, then the user.
        self.db()
            .query(
                "BEGIN TRANSACTION; \
                 DELETE reservation WHERE user_id = $id; \
                 DELETE vehicle WHERE user_id = $id; \
                 DELETE type::record('user', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn any_admin(&self) -> ParkadeResult<bool> {
        let mut result = self
            .db()
            .query("SELECT count() AS total FROM user WHERE role = 'Admin' GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(count_of(rows) > 0)
    }

    async fn list(&self, pagination: Pagination) -> ParkadeResult<PaginatedResult<User>> {
        let mut count_result = self
            .db()
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let total = count_of(count_result.take(0).map_err(DbError::from)?);

        let mut result = self
            .db()
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY registered_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(UserRow::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

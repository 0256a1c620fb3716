//! Parkade Server: Application entry point.
//!
//! Connects to SurrealDB, applies migrations and makes sure an
//! administrator account exists.

mod config;

use parkade_auth::AuthService;
use parkade_core::error::{ParkadeError, ParkadeResult};
use parkade_db::repository::SurrealUserRepository;
use parkade_db::{DbError, Store};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> ParkadeResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parkade=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    tracing::info!("Starting Parkade server...");

    let config = ServerConfig::from_env()?;

    let store = Store::connect(&config.db).await.map_err(DbError::from)?;
    parkade_db::run_migrations(store.client()).await?;

    let users = match &config.auth.pepper {
        Some(pepper) => SurrealUserRepository::with_pepper(store.clone(), pepper.clone()),
        None => SurrealUserRepository::new(store.clone()),
    };
    let auth = AuthService::new(users, config.auth.clone());
    if let Some(admin) = auth
        .ensure_admin(
            &config.auth.admin_email,
            &config.auth.admin_password,
            &config.auth.admin_full_name,
        )
        .await?
    {
        tracing::warn!(
            user_id = %admin.id,
            email = %admin.email,
            "Created bootstrap administrator; change its password"
        );
    }

    tracing::info!("Parkade store ready");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| ParkadeError::Internal(e.to_string()))?;

    tracing::info!("Parkade server stopped.");
    Ok(())
}

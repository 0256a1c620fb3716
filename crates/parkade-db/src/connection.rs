//! SurrealDB connection management and the store-wide write gate.

use std::sync::Arc;

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "parkade".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Shared handle to the database.
///
/// Every repository built from the same `Store` (or a clone of it) shares
/// one write gate. Mutating operations hold the gate from their first
/// precondition read until their transaction commits, so no two of them
/// interleave. Read-only queries do not take the gate.
pub struct Store<C: Connection> {
    db: Surreal<C>,
    write_gate: Arc<Mutex<()>>,
}

impl<C: Connection> Clone for Store<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            write_gate: Arc::clone(&self.write_gate),
        }
    }
}

impl<C: Connection> Store<C> {
    /// Wrap an already configured client (namespace and database selected).
    ///
    /// Each call creates a fresh write gate. Only clones of the returned
    /// store share it, so build one store per database and clone it into
    /// every repository. Two stores over the same client, or writers in
    /// another process, are not serialized against each other.
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }

    /// Waits for exclusive write access.
    pub async fn write(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }
}

impl Store<Client> {
    /// Connect to SurrealDB using the provided configuration.
    ///
    /// Authenticates as root, selects the configured namespace and
    /// database, and returns a ready-to-use store.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Successfully connected to SurrealDB");

        Ok(Self::new(db))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::local::Mem;

    #[tokio::test]
    async fn gate_is_shared_by_clones_only() {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        let store = Store::new(db.clone());
        let clone = store.clone();
        let separate = Store::new(db);

        let _held = store.write().await;
        assert!(clone.write_gate.try_lock().is_err());
        assert!(separate.write_gate.try_lock().is_ok());
    }
}

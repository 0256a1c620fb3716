//! Server configuration assembled from `.env` and `PARKADE_*` variables.

use std::env;

use parkade_auth::AuthConfig;
use parkade_core::error::{ParkadeError, ParkadeResult};
use parkade_db::DbConfig;

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults of each section.
    pub fn from_env() -> ParkadeResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> ParkadeResult<Self> {
        let mut config = Self::default();

        let db = &mut config.db;
        if let Some(url) = var("PARKADE_DB_URL") {
            db.url = url;
        }
        if let Some(namespace) = var("PARKADE_DB_NAMESPACE") {
            db.namespace = namespace;
        }
        if let Some(database) = var("PARKADE_DB_DATABASE") {
            db.database = database;
        }
        if let Some(username) = var("PARKADE_DB_USERNAME") {
            db.username = username;
        }
        if let Some(password) = var("PARKADE_DB_PASSWORD") {
            db.password = password;
        }

        let auth = &mut config.auth;
        auth.pepper = var("PARKADE_PASSWORD_PEPPER").filter(|p| !p.is_empty());
        if let Some(raw) = var("PARKADE_MIN_PASSWORD_LENGTH") {
            auth.min_password_length = raw.parse().map_err(|_| {
                ParkadeError::validation(format!("invalid PARKADE_MIN_PASSWORD_LENGTH: {raw}"))
            })?;
        }
        if let Some(email) = var("PARKADE_ADMIN_EMAIL") {
            auth.admin_email = email;
        }
        if let Some(password) = var("PARKADE_ADMIN_PASSWORD") {
            auth.admin_password = password;
        }
        if let Some(name) = var("PARKADE_ADMIN_NAME") {
            auth.admin_full_name = name;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> ParkadeResult<ServerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = load(&[]).unwrap();
        assert_eq!(config.db.namespace, "parkade");
        assert_eq!(config.auth.min_password_length, 8);
        assert!(config.auth.pepper.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let config = load(&[
            ("PARKADE_DB_URL", "db.internal:8000"),
            ("PARKADE_PASSWORD_PEPPER", "s3cret"),
            ("PARKADE_MIN_PASSWORD_LENGTH", "12"),
            ("PARKADE_ADMIN_EMAIL", "ops@example.com"),
        ])
        .unwrap();
        assert_eq!(config.db.url, "db.internal:8000");
        assert_eq!(config.auth.pepper.as_deref(), Some("s3cret"));
        assert_eq!(config.auth.min_password_length, 12);
        assert_eq!(config.auth.admin_email, "ops@example.com");
    }

    #[test]
    fn bad_number_is_rejected() {
        assert!(load(&[("PARKADE_MIN_PASSWORD_LENGTH", "many")]).is_err());
    }
}

//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing and
    /// verification. Must match the pepper given to the user repository.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
    /// Email of the administrator created on first start-up.
    pub admin_email: String,
    /// Initial password of the bootstrap administrator.
    pub admin_password: String,
    pub admin_full_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 8,
            admin_email: "admin@parkade.local".into(),
            admin_password: "change-me-now".into(),
            admin_full_name: "Administrator".into(),
        }
    }
}

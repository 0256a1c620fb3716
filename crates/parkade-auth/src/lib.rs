//! Parkade Auth: Registration, password login and password changes.

pub mod config;
pub mod error;
pub mod password;
pub mod service;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, ChangePassword, RegisterInput};

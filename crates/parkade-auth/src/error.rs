//! Authentication error types.

use parkade_core::error::ParkadeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("new password and confirmation do not match")]
    ConfirmationMismatch,

    #[error("new password must differ from the current one")]
    PasswordUnchanged,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for ParkadeError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ParkadeError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::PasswordTooShort { .. }
            | AuthError::ConfirmationMismatch
            | AuthError::PasswordUnchanged => ParkadeError::validation(err.to_string()),
            AuthError::Crypto(msg) => ParkadeError::Internal(msg),
        }
    }
}

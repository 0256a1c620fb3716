//! Authentication service: registration, login and password changes.

use parkade_core::caller::Caller;
use parkade_core::error::{ParkadeError, ParkadeResult};
use parkade_core::models::user::{CreateUser, Role, User};
use parkade_core::repository::UserRepository;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;

/// Input for self-service registration.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Input for a password change.
#[derive(Debug)]
pub struct ChangePassword {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    /// Create a Member account.
    pub async fn register(&self, input: RegisterInput) -> ParkadeResult<User> {
        let email = input.email.trim();
        if !email.contains('@') {
            return Err(ParkadeError::validation(format!(
                "'{email}' is not an email address"
            )));
        }
        if input.full_name.trim().is_empty() {
            return Err(ParkadeError::validation("full name must not be empty"));
        }
        password::check_length(&input.password, self.config.min_password_length)?;

        let user = self
            .user_repo
            .create(CreateUser {
                email: email.to_string(),
                password: input.password,
                full_name: input.full_name,
                role: Role::Member,
            })
            .await?;

        info!(user_id = %user.id, "Member registered");
        Ok(user)
    }

    /// Check an email and password and return the caller context for the
    /// account. Unknown emails and wrong passwords fail identically.
    pub async fn login(&self, email: &str, password: &str) -> ParkadeResult<Caller> {
        let user = match self.user_repo.get_by_email(email).await {
            Ok(u) => u,
            Err(ParkadeError::NotFound { .. }) => {
                warn!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, role = ?user.role, "User logged in");
        Ok(Caller::new(user.id, user.role))
    }

    /// Change the caller's own password.
    pub async fn change_password(&self, caller: &Caller, input: ChangePassword) -> ParkadeResult<()> {
        let user = self.user_repo.get_by_id(caller.user_id).await?;

        let valid = password::verify_password(
            &input.current,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }
        if input.new != input.confirm {
            return Err(AuthError::ConfirmationMismatch.into());
        }
        if input.new == input.current {
            return Err(AuthError::PasswordUnchanged.into());
        }
        password::check_length(&input.new, self.config.min_password_length)?;

        self.user_repo.set_password(user.id, &input.new).await
    }

    /// Create the bootstrap administrator unless an admin already exists.
    ///
    /// Returns the new account, or `None` when nothing was created.
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> ParkadeResult<Option<User>> {
        if self.user_repo.any_admin().await? {
            return Ok(None);
        }

        let admin = self
            .user_repo
            .create(CreateUser {
                email: email.to_string(),
                password: password.to_string(),
                full_name: full_name.to_string(),
                role: Role::Admin,
            })
            .await?;

        info!(user_id = %admin.id, "Bootstrap administrator created");
        Ok(Some(admin))
    }
}

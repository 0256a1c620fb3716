//! Explicit caller context.
//!
//! Every service operation receives the identity and role of whoever
//! invoked it. Nothing in Parkade reads ambient session state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ParkadeError, ParkadeResult};
use crate::models::user::Role;

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn member(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Member)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails unless the caller is an administrator.
    pub fn require_admin(&self) -> ParkadeResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ParkadeError::AuthorizationDenied {
                reason: "administrator role required".into(),
            })
        }
    }

    /// Fails unless the caller is `user_id` or an administrator.
    pub fn require_self_or_admin(&self, user_id: Uuid) -> ParkadeResult<()> {
        if self.is_admin() || self.user_id == user_id {
            Ok(())
        } else {
            Err(ParkadeError::AuthorizationDenied {
                reason: format!("caller {} may not act for user {user_id}", self.user_id),
            })
        }
    }
}

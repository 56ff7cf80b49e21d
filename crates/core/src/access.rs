//! Owner-or-admin access guard.
//!
//! Every read and mutation of an order goes through [`authorize`]; catalog
//! writes go through [`require_admin`]. Handlers never compare ids
//! themselves.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{UserId, UserRole};

/// The actor lacks the right to perform an operation.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("access denied")]
pub struct AccessDenied;

/// Who is performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// `None` for guests and for system tasks.
    pub user_id: Option<UserId>,
    pub role: UserRole,
}

impl Actor {
    /// An unauthenticated visitor.
    #[must_use]
    pub const fn guest() -> Self {
        Self {
            user_id: None,
            role: UserRole::User,
        }
    }

    #[must_use]
    pub const fn user(id: UserId) -> Self {
        Self {
            user_id: Some(id),
            role: UserRole::User,
        }
    }

    #[must_use]
    pub const fn admin(id: UserId) -> Self {
        Self {
            user_id: Some(id),
            role: UserRole::Admin,
        }
    }

    /// Admin rights without a user, for CLI and maintenance tasks.
    #[must_use]
    pub const fn system() -> Self {
        Self {
            user_id: None,
            role: UserRole::Admin,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Whether the actor owns a record owned by `owner`.
    ///
    /// Guests own nothing, including ownerless records.
    #[must_use]
    pub fn owns(&self, owner: Option<UserId>) -> bool {
        matches!((self.user_id, owner), (Some(actor), Some(owner)) if actor == owner)
    }
}

/// Permit the owner of a record or any admin.
///
/// # Errors
///
/// Returns `AccessDenied` for anyone else.
pub fn authorize(actor: &Actor, owner: Option<UserId>) -> Result<(), AccessDenied> {
    if actor.is_admin() || actor.owns(owner) {
        Ok(())
    } else {
        Err(AccessDenied)
    }
}

/// Permit admins only.
///
/// # Errors
///
/// Returns `AccessDenied` for non-admins.
pub const fn require_admin(actor: &Actor) -> Result<(), AccessDenied> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AccessDenied)
    }
}

//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use door_portal_core::{Actor, Email, UserId, UserRole};

/// A portal account (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The actor this user acts as.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor {
            user_id: Some(self.id),
            role: self.role,
        }
    }
}

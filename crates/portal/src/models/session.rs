//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use door_portal_core::{Actor, Email, UserId, UserRole};

use super::user::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. The
/// role is captured at login; a role change takes effect on the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's role.
    pub role: UserRole,
}

impl CurrentUser {
    /// The actor used for access checks.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor {
            user_id: Some(self.id),
            role: self.role,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session keys for authentication and cart data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the session cart.
    pub const CART: &str = "cart";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_actor_carries_role() {
        let user = CurrentUser {
            id: UserId::new(7),
            email: Email::parse("admin@doors.test").unwrap(),
            role: UserRole::Admin,
        };
        let actor = user.actor();
        assert_eq!(actor.user_id, Some(UserId::new(7)));
        assert!(actor.is_admin());
        assert!(user.is_admin());
    }

    #[test]
    fn test_current_user_session_round_trip() {
        let user = CurrentUser {
            id: UserId::new(3),
            email: Email::parse("buyer@doors.test").unwrap(),
            role: UserRole::User,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "user");
        let back: CurrentUser = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
    }
}

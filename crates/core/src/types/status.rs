//! Status enums: order lifecycle state and user roles.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
///
/// ```text
/// Draft ──submit──► Processing ──► Shipped ──► Delivered
///   │                 │   ▲
///   │                 ▼   │
///   │               On Hold
///   ▼                 │
/// Cancelled ◄─────────┘ (from any non-terminal state)
/// ```
///
/// The portal never creates `Pending`; it is reserved for orders entered
/// through an external intake. New submissions start in `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portal.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Saved by the customer, not yet submitted.
    Draft,
    Pending,
    #[default]
    Processing,
    OnHold,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Draft,
        Self::Pending,
        Self::Processing,
        Self::OnHold,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Delivered and Cancelled orders never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether `self → next` is an allowed status change.
    ///
    /// Re-setting the current status is not a transition; callers treat it
    /// as a no-op before asking.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (_, Self::Draft) => false,
            (Self::Draft, Self::Processing | Self::Cancelled)
            | (
                Self::Pending,
                Self::Processing | Self::OnHold | Self::Shipped | Self::Cancelled,
            )
            | (Self::Processing, Self::OnHold | Self::Shipped | Self::Cancelled)
            | (Self::OnHold, Self::Processing | Self::Cancelled)
            | (Self::Shipped, Self::Delivered) => true,
            _ => false,
        }
    }

    /// Human-readable label used in notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::OnHold => "On Hold",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Role attached to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portal.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A customer placing orders for their own account.
    #[default]
    User,
    /// Staff: manages the catalog and every order.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" | "customer" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_nothing_returns_to_draft() {
        for from in OrderStatus::ALL {
            assert!(!from.can_transition_to(OrderStatus::Draft));
        }
    }

    #[test]
    fn test_on_hold_round_trips_with_processing() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::OnHold));
        assert!(OrderStatus::OnHold.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn test_delivered_cannot_go_back_to_processing() {
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn test_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OnHold).ok().as_deref(),
            Some("\"on_hold\"")
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"delivered\"").ok(),
            Some(OrderStatus::Delivered)
        );
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!("user".parse::<UserRole>(), Ok(UserRole::User));
        assert!("root".parse::<UserRole>().is_err());
    }
}

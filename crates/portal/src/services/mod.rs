//! Business logic services for the portal.
//!
//! # Services
//!
//! - `auth` - Password authentication and account management
//! - `email` - Order emails over SMTP
//! - `notifier` - The order notifier handed to the core order service

pub mod auth;
pub mod email;
pub mod notifier;

pub use auth::{AuthError, AuthService};
pub use email::{EmailError, EmailService};
pub use notifier::PortalNotifier;

//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use door_portal_core::{CatalogService, OrderService, PricingPolicy, PromoCodes};

use crate::config::PortalConfig;
use crate::db::{PgCatalogStore, PgOrderStore};
use crate::services::{AuthService, EmailService, PortalNotifier};

/// Order service over the portal's stores and notifier.
pub type PortalOrderService<'a> = OrderService<'a, PgOrderStore, PgCatalogStore, PortalNotifier>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    pool: PgPool,
    catalog: PgCatalogStore,
    orders: PgOrderStore,
    notifier: PortalNotifier,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Email notifications go through SMTP when configured and to the log
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be configured.
    pub fn new(
        config: PortalConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let notifier = match &config.email {
            Some(email) => PortalNotifier::Email(EmailService::new(email)?),
            None => {
                tracing::warn!("SMTP not configured, order emails will only be logged");
                PortalNotifier::Log
            }
        };
        Ok(Self::with_notifier(config, pool, notifier))
    }

    /// Create application state with an explicit notifier.
    #[must_use]
    pub fn with_notifier(config: PortalConfig, pool: PgPool, notifier: PortalNotifier) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: PgCatalogStore::new(pool.clone()),
                orders: PgOrderStore::new(pool.clone()),
                config,
                pool,
                notifier,
            }),
        }
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Pricing knobs from configuration.
    #[must_use]
    pub fn pricing(&self) -> &PricingPolicy {
        &self.inner.config.pricing
    }

    /// Promo code table from configuration.
    #[must_use]
    pub fn promo_codes(&self) -> &PromoCodes {
        &self.inner.config.promo_codes
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog_store(&self) -> &PgCatalogStore {
        &self.inner.catalog
    }

    /// Catalog service over the `PostgreSQL` store.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_, PgCatalogStore> {
        CatalogService::new(&self.inner.catalog)
    }

    /// Order service over the `PostgreSQL` stores and configured notifier.
    #[must_use]
    pub fn orders(&self) -> PortalOrderService<'_> {
        OrderService::new(
            &self.inner.orders,
            &self.inner.catalog,
            &self.inner.notifier,
            &self.inner.config.pricing,
            &self.inner.config.promo_codes,
        )
    }

    /// Authentication service over the connection pool.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.pool)
    }
}

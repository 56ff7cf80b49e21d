//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Auth
//! POST /auth/login             - Password login
//! POST /auth/logout            - Logout
//! GET  /auth/me                - Current user
//!
//! # Catalog (public)
//! GET  /api/catalog                    - Full catalog snapshot
//! GET  /api/catalog/door-styles        - Door styles (available only, unless admin)
//! GET  /api/catalog/manufacturers      - Manufacturers
//! GET  /api/catalog/finishes           - Finishes with manufacturer names
//! GET  /api/catalog/glass-types        - Glass types
//!
//! # Cart (session)
//! GET    /api/cart             - Cart with live totals
//! DELETE /api/cart             - Empty the cart
//! POST   /api/cart/items       - Add configured items
//! PATCH  /api/cart/items/:id   - Change quantity
//! DELETE /api/cart/items/:id   - Remove an item
//! POST   /api/cart/promo       - Apply a promo code
//! PATCH  /api/cart/settings    - Change measurement unit
//! POST   /api/cart/checkout    - Turn the cart into an order
//!
//! # Orders
//! GET    /api/orders                     - Own orders (all for admins)
//! POST   /api/orders                     - Submit an order directly
//! GET    /api/orders/:id                 - Order detail
//! DELETE /api/orders/:id                 - Delete (admins, or owners of drafts)
//! PATCH  /api/orders/:id/status          - Change status
//! POST   /api/orders/drafts              - Save a draft
//! PUT    /api/orders/drafts/:id          - Replace a draft
//! POST   /api/orders/drafts/:id/submit   - Submit a draft
//!
//! # Admin catalog (requires admin)
//! POST/PUT/DELETE /api/admin/catalog/{door-styles,manufacturers,finishes,glass-types}[/:id]
//! ```

pub mod admin_catalog;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod orders;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the public catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::snapshot))
        .route("/door-styles", get(catalog::door_styles))
        .route("/manufacturers", get(catalog::manufacturers))
        .route("/finishes", get(catalog::finishes))
        .route("/glass-types", get(catalog::glass_types))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update).delete(cart::remove))
        .route("/promo", post(cart::apply_promo))
        .route("/settings", patch(cart::settings))
        .route("/checkout", post(cart::checkout))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show).delete(orders::delete))
        .route("/{id}/status", patch(orders::update_status))
        .route("/drafts", post(orders::save_draft))
        .route("/drafts/{id}", put(orders::update_draft))
        .route("/drafts/{id}/submit", post(orders::submit_draft))
}

/// Create the admin catalog routes router.
pub fn admin_catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/door-styles", post(admin_catalog::create_door_style))
        .route(
            "/door-styles/{id}",
            put(admin_catalog::update_door_style).delete(admin_catalog::delete_door_style),
        )
        .route("/manufacturers", post(admin_catalog::create_manufacturer))
        .route(
            "/manufacturers/{id}",
            put(admin_catalog::update_manufacturer).delete(admin_catalog::delete_manufacturer),
        )
        .route("/finishes", post(admin_catalog::create_finish))
        .route(
            "/finishes/{id}",
            put(admin_catalog::update_finish).delete(admin_catalog::delete_finish),
        )
        .route("/glass-types", post(admin_catalog::create_glass_type))
        .route(
            "/glass-types/{id}",
            put(admin_catalog::update_glass_type).delete(admin_catalog::delete_glass_type),
        )
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/catalog", catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/admin/catalog", admin_catalog_routes())
        .layer(api_rate_limiter());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Auth routes, strictly rate limited
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
        // JSON API
        .nest("/api", api)
}

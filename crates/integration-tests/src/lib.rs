//! Integration tests for Door Portal.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process flows (no database needed)
//! cargo test -p door-portal-integration-tests
//!
//! # HTTP tests against a running portal
//! cargo run -p door-portal-cli -- migrate
//! cargo run -p door-portal-cli -- seed catalog crates/cli/data/catalog.yaml
//! cargo run -p door-portal &
//! cargo test -p door-portal-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog_pricing_flow` - Catalog edits, cart totals and checkout against
//!   the in-memory stores
//! - `portal_api` - JSON API tests against a running server
//!
//! # Environment Variables
//!
//! - `PORTAL_TEST_URL` - Base URL of the running portal (default `http://localhost:3000`)
//! - `PORTAL_TEST_ADMIN_EMAIL` / `PORTAL_TEST_ADMIN_PASSWORD` - An admin account
//!   created with `dp-cli user create -r admin`

use rust_decimal::Decimal;
use serde_json::{Value, json};

use door_portal_core::catalog::{DoorStyle, Finish, GlassType, Manufacturer};
use door_portal_core::{CatalogSnapshot, DoorStyleId, FinishId, GlassTypeId, ManufacturerId};

/// Base URL of the running portal.
#[must_use]
pub fn portal_base_url() -> String {
    std::env::var("PORTAL_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Admin credentials for the running portal, if configured.
#[must_use]
pub fn admin_credentials() -> Option<(String, String)> {
    let email = std::env::var("PORTAL_TEST_ADMIN_EMAIL").ok()?;
    let password = std::env::var("PORTAL_TEST_ADMIN_PASSWORD").ok()?;
    Some((email, password))
}

/// A catalog with one available and one retired door style, one finish per
/// manufacturer and a glass type with a minimum.
#[must_use]
pub fn sample_snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        door_styles: vec![
            DoorStyle {
                id: DoorStyleId::new(1),
                name: "Shaker".into(),
                available: true,
            },
            DoorStyle {
                id: DoorStyleId::new(2),
                name: "Beadboard".into(),
                available: false,
            },
        ],
        manufacturers: vec![
            Manufacturer {
                id: ManufacturerId::new(1),
                name: "Acme".into(),
            },
            Manufacturer {
                id: ManufacturerId::new(2),
                name: "Northwood".into(),
            },
        ],
        finishes: vec![
            Finish {
                id: FinishId::new(1),
                name: "White".into(),
                manufacturer_id: ManufacturerId::new(1),
                manufacturer: "Acme".into(),
                sqft_price: Decimal::new(1250, 2),
            },
            Finish {
                id: FinishId::new(2),
                name: "White".into(),
                manufacturer_id: ManufacturerId::new(2),
                manufacturer: "Northwood".into(),
                sqft_price: Decimal::from(11),
            },
        ],
        glass_types: vec![GlassType {
            id: GlassTypeId::new(1),
            name: "Clear".into(),
            sqft_price: Decimal::from(15),
            sqft_minimum: Decimal::from(2),
        }],
    }
}

/// JSON body for one configured door.
#[must_use]
pub fn door_json(width: u32, height: u32, qty: u32) -> Value {
    json!({
        "qty": qty,
        "width": width.to_string(),
        "height": height.to_string(),
        "doorStyle": "Shaker",
        "finish": { "name": "White", "manufacturer": "Acme Coatings" },
    })
}

/// JSON body for checkout details.
#[must_use]
pub fn checkout_json(email: &str) -> Value {
    json!({
        "customer": {
            "name": "Integration Tester",
            "email": email,
            "phone": "555-0199",
            "company": null,
            "address": "1 Test Way",
            "city": "Eugene",
            "state": "OR",
            "zipCode": "97401",
        },
        "shippingNotes": "Call before delivery",
        "paymentMethod": "invoice",
    })
}

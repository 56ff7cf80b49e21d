//! HTTP tests against a running portal.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database seeded with `crates/cli/data/catalog.yaml`
//! - The portal running (cargo run -p door-portal)
//! - `PORTAL_TEST_ADMIN_EMAIL` / `PORTAL_TEST_ADMIN_PASSWORD` for admin tests
//!
//! Run with: cargo test -p door-portal-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use door_portal_integration_tests::{admin_credentials, checkout_json, door_json, portal_base_url};

/// Client that keeps the session cookie between requests.
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Log in as the configured admin.
async fn admin_client() -> Client {
    let (email, password) =
        admin_credentials().expect("PORTAL_TEST_ADMIN_EMAIL and PORTAL_TEST_ADMIN_PASSWORD");
    let client = session_client();
    let resp = client
        .post(format!("{}/auth/login", portal_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);
    client
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_health_and_readiness() {
    let client = session_client();
    let base_url = portal_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to call health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to call readiness");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

// ============================================================================
// Cart & Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_guest_cart_checkout() {
    let client = session_client();
    let base_url = portal_base_url();

    let resp = client
        .post(format!("{base_url}/api/cart/items"))
        .json(&json!({ "items": [door_json(24, 30, 2), door_json(0, 30, 1)] }))
        .send()
        .await
        .expect("Failed to add items");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Invalid cart JSON");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));

    let resp = client
        .post(format!("{base_url}/api/cart/checkout"))
        .json(&checkout_json("guest@example.com"))
        .send()
        .await
        .expect("Failed to check out");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Invalid order JSON");
    assert_eq!(order["status"], "processing");
    assert!(order["ownerId"].is_null());

    let cart: Value = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Invalid cart JSON");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_add_rejects_only_invalid_rows() {
    let client = session_client();
    let resp = client
        .post(format!("{}/api/cart/items", portal_base_url()))
        .json(&json!({ "items": [door_json(0, 0, 1)] }))
        .send()
        .await
        .expect("Failed to add items");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_checkout_empty_cart_is_rejected() {
    let client = session_client();
    let resp = client
        .post(format!("{}/api/cart/checkout", portal_base_url()))
        .json(&checkout_json("empty@example.com"))
        .send()
        .await
        .expect("Failed to check out");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_guest_cannot_list_orders_or_write_catalog() {
    let client = session_client();
    let base_url = portal_base_url();

    let resp = client
        .get(format!("{base_url}/api/orders"))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base_url}/api/admin/catalog/door-styles"))
        .json(&json!({ "name": "Mission" }))
        .send()
        .await
        .expect("Failed to call admin catalog");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running portal server and admin credentials"]
async fn test_admin_catalog_round_trip() {
    let client = admin_client().await;
    let base_url = portal_base_url();
    let name = format!("Test Style {}", std::process::id());

    let resp = client
        .post(format!("{base_url}/api/admin/catalog/door-styles"))
        .json(&json!({ "name": name, "available": false }))
        .send()
        .await
        .expect("Failed to create door style");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let style: Value = resp.json().await.expect("Invalid door style JSON");
    let id = style["id"].as_i64().expect("door style id");

    let resp = client
        .post(format!("{base_url}/api/admin/catalog/door-styles"))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create duplicate");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = client
        .delete(format!("{base_url}/api/admin/catalog/door-styles/{id}"))
        .send()
        .await
        .expect("Failed to delete door style");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running portal server and admin credentials"]
async fn test_admin_moves_order_through_lifecycle() {
    let client = admin_client().await;
    let base_url = portal_base_url();

    client
        .post(format!("{base_url}/api/cart/items"))
        .json(&json!({ "items": [door_json(24, 30, 1)] }))
        .send()
        .await
        .expect("Failed to add items");
    let order: Value = client
        .post(format!("{base_url}/api/cart/checkout"))
        .json(&checkout_json("lifecycle@example.com"))
        .send()
        .await
        .expect("Failed to check out")
        .json()
        .await
        .expect("Invalid order JSON");
    let id = order["id"].as_str().expect("order id");

    for (status, expected) in [
        ("shipped", StatusCode::OK),
        ("delivered", StatusCode::OK),
        ("processing", StatusCode::BAD_REQUEST),
    ] {
        let resp = client
            .patch(format!("{base_url}/api/orders/{id}/status"))
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("Failed to update status");
        assert_eq!(resp.status(), expected, "{status}");
    }

    let resp = client
        .delete(format!("{base_url}/api/orders/{id}"))
        .send()
        .await
        .expect("Failed to delete order");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

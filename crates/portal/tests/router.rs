//! Router tests that need no database.
//!
//! The pool connects lazily, so only requests that stop before a query
//! (health, auth rejections, middleware headers) are exercised here.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use door_portal::config::PortalConfig;
use door_portal::services::PortalNotifier;
use door_portal::state::AppState;
use door_portal_core::{PricingPolicy, PromoCodes};

fn test_app() -> Router {
    let config = PortalConfig {
        database_url: SecretString::from("postgres://portal@localhost:1/portal_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6-vE8+"),
        pricing: PricingPolicy::default(),
        promo_codes: PromoCodes::new(),
        email: None,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://portal@localhost:1/portal_test")
        .unwrap();
    door_portal::app(AppState::with_notifier(config, pool, PortalNotifier::Log))
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.9")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap()
}

#[tokio::test]
async fn test_health_sets_security_and_request_id_headers() {
    let resp = test_app().oneshot(request("GET", "/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_incoming_request_id_is_echoed() {
    let mut req = request("GET", "/health");
    req.headers_mut()
        .insert("x-request-id", "upstream-123".parse().unwrap());
    let resp = test_app().oneshot(req).await.unwrap();
    assert_eq!(resp.headers()["x-request-id"], "upstream-123");
}

#[tokio::test]
async fn test_orders_require_login() {
    for (method, uri) in [
        ("GET", "/api/orders"),
        ("POST", "/api/orders/drafts"),
        ("DELETE", "/api/orders/00000000-0000-0000-0000-000000000000"),
        ("GET", "/auth/me"),
    ] {
        let resp = test_app().oneshot(request(method, uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_admin_catalog_requires_login() {
    for (method, uri) in [
        ("POST", "/api/admin/catalog/door-styles"),
        ("PUT", "/api/admin/catalog/finishes/1"),
        ("DELETE", "/api/admin/catalog/glass-types/1"),
    ] {
        let resp = test_app().oneshot(request(method, uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Login required");
    }
}

//! HTTP surface tests: the full axum router over in-memory adapters, with a
//! static token table standing in for the identity provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use submarket::adapters::auth::MockAuthProvider;
use submarket::adapters::http::{router, AppState, RedirectUrls};
use submarket::adapters::memory::{InMemoryAccountStore, InMemoryCatalogStore};
use submarket::adapters::stripe::MockGateway;

fn test_app() -> axum::Router {
    let auth = MockAuthProvider::new()
        .with_token("tok-client", "client-1", Some("ada@example.com"))
        .with_token("tok-provider", "prov-1", Some("biz@example.com"))
        .with_token("tok-no-email", "client-2", None);

    let state = AppState::new(
        Arc::new(InMemoryCatalogStore::new()),
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(MockGateway::new()),
        Arc::new(auth),
        RedirectUrls {
            onboarding_refresh: "http://localhost:3000/onboarding/refresh".to_string(),
            onboarding_return: "http://localhost:3000/onboarding/complete".to_string(),
            setup_success: "http://localhost:3000/billing/setup/success".to_string(),
            setup_cancel: "http://localhost:3000/billing/setup/cancel".to_string(),
        },
    );
    router(state)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register_client(app: &axum::Router, token: &str) -> Value {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/clients",
            Some(token),
            Some(json!({"first_name": "Ada", "last_name": "Lovelace"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn register_provider_with_plan(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/providers",
            Some("tok-provider"),
            Some(json!({"business_name": "Morning Flow Yoga", "category": "fitness"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/plans",
            Some("tok-provider"),
            Some(json!({
                "title": "Weekly Yoga",
                "price": "10.00",
                "currency": "CAD",
                "billing_cycle": "monthly"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let plan = body_json(response).await;
    plan["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/plans")
                .header(header::ORIGIN, "http://localhost:3000")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn missing_bearer_token_is_unauthorized() {
    let app = test_app();
    let response = app
        .oneshot(request("GET", "/api/clients/me", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let app = test_app();
    let response = app
        .oneshot(request("GET", "/api/clients/me", Some("nope"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn client_registration_roundtrip() {
    let app = test_app();
    let created = register_client(&app, "tok-client").await;
    assert_eq!(created["id"], "client-1");
    assert_eq!(created["first_name"], "Ada");

    let response = app
        .oneshot(request("GET", "/api/clients/me", Some("tok-client"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["id"], "client-1");
    assert_eq!(me["subscriptions"], json!([]));
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app();
    register_client(&app, "tok-client").await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/clients",
            Some("tok-client"),
            Some(json!({"first_name": "Ada", "last_name": "Lovelace"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_plan_payload_is_bad_request() {
    let app = test_app();
    register_provider_with_plan(&app).await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/plans",
            Some("tok-provider"),
            Some(json!({
                "title": "Bad Price",
                "price": "10.001",
                "currency": "CAD",
                "billing_cycle": "monthly"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn subscribe_flow_over_http() {
    let app = test_app();
    register_client(&app, "tok-client").await;
    let plan_id = register_provider_with_plan(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/subscriptions/{plan_id}"),
            Some("tok-client"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["newly_subscribed"], true);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/clients/me", Some("tok-client"), None))
        .await
        .unwrap();
    let me = body_json(response).await;
    assert_eq!(me["subscriptions"][0]["plan_id"], plan_id);

    let response = app
        .oneshot(request(
            "DELETE",
            &format!("/api/subscriptions/{plan_id}"),
            Some("tok-client"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn subscribe_without_email_claim_is_unauthorized() {
    let app = test_app();
    let plan_id = register_provider_with_plan(&app).await;
    register_client(&app, "tok-no-email").await;

    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/subscriptions/{plan_id}"),
            Some("tok-no-email"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn subscribing_to_a_malformed_plan_id_is_not_found() {
    let app = test_app();
    register_client(&app, "tok-client").await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/subscriptions/not-a-uuid",
            Some("tok-client"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gateway_decline_maps_to_payment_required() {
    let auth = MockAuthProvider::new()
        .with_token("tok-client", "client-1", Some("ada@example.com"))
        .with_token("tok-provider", "prov-1", Some("biz@example.com"));
    let gateway = Arc::new(MockGateway::new());
    let state = AppState::new(
        Arc::new(InMemoryCatalogStore::new()),
        Arc::new(InMemoryAccountStore::new()),
        gateway.clone(),
        Arc::new(auth),
        RedirectUrls {
            onboarding_refresh: "http://localhost:3000/r".to_string(),
            onboarding_return: "http://localhost:3000/c".to_string(),
            setup_success: "http://localhost:3000/s".to_string(),
            setup_cancel: "http://localhost:3000/x".to_string(),
        },
    );
    let app = router(state);

    register_client(&app, "tok-client").await;
    let plan_id = register_provider_with_plan(&app).await;

    gateway.fail_next_subscription(submarket::ports::GatewayError::Rejected(
        "card declined".to_string(),
    ));
    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/subscriptions/{plan_id}"),
            Some("tok-client"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn provider_onboarding_returns_a_link() {
    let app = test_app();
    let _plan_id = register_provider_with_plan(&app).await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/billing/onboarding",
            Some("tok-provider"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["url"].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn webhook_without_signature_header_is_unauthorized() {
    let app = test_app();
    let response = app
        .oneshot(request(
            "POST",
            "/webhooks/stripe",
            None,
            Some(json!({"type": "setup_intent.succeeded"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

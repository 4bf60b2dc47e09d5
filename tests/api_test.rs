//! HTTP surface: routing, auth resolution, status codes and error bodies.
//!
//! Requests run through the full router against the in-memory database;
//! the last test swaps the container for a mock.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{accepting_blobs, property_draft, test_config, TestApp, PASSWORD};
use realty_api::api::{create_router, AppState};
use realty_api::domain::{Principal, RegisterUser, UserResponse};
use realty_api::errors::{AppError, AppResult};
use realty_api::infra::Database;
use realty_api::services::{AuthService, Claims, MockServiceContainer, TokenResponse};

fn router_for(app: &TestApp) -> Router {
    let database = Arc::new(Database::from_connection(app.db.clone()));
    create_router(AppState::with_blob_store(
        database,
        test_config(),
        Arc::new(accepting_blobs()),
    ))
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn token_for(router: &Router, email: &str) -> String {
    let (status, body) = send(
        router,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_database() {
    let app = TestApp::new().await;
    let (status, body) = send(&router_for(&app), get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "healthy");
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new().await;
    let router = router_for(&app);

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({
                "email": "new@example.com",
                "password": PASSWORD,
                "password2": PASSWORD,
                "first_name": "New",
                "last_name": "Buyer"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["roles"], json!(["user"]));
    assert!(body.get("password_hash").is_none());

    let token = token_for(&router, "new@example.com").await;
    let (status, roles) = send(&router, get("/api/users/roles", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roles, json!(["user"]));
}

#[tokio::test]
async fn test_register_reports_field_errors() {
    let app = TestApp::new().await;
    let (status, body) = send(
        &router_for(&app),
        json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({
                "email": "not-an-email",
                "password": "short",
                "password2": "short",
                "first_name": "A",
                "last_name": "B"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["email"].is_array());
    assert!(body["error"]["details"]["password"].is_array());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.user("buyer@example.com", &[]).await;

    let (status, body) = send(
        &router_for(&app),
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "buyer@example.com", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_signed_in_routes_reject_missing_or_bad_tokens() {
    let app = TestApp::new().await;
    let router = router_for(&app);

    let (status, _) = send(&router, get("/api/properties/favorites", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, get("/api/properties/favorites", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A bad header is rejected even on public routes
    let (status, _) = send(&router, get("/api/areas", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, get("/api/areas", None)).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Resources
// =============================================================================

#[tokio::test]
async fn test_area_writes_need_staff() {
    let app = TestApp::new().await;
    app.admin().await;
    app.user("buyer@example.com", &[]).await;
    let router = router_for(&app);
    let admin = token_for(&router, "admin@example.com").await;
    let buyer = token_for(&router, "buyer@example.com").await;

    let area = json!({
        "name": "Dubai Creek Harbour",
        "description": "Waterfront district",
        "featured": true,
        "perks": [{ "name": "Marina", "description": "Yacht berths" }]
    });

    let (status, _) = send(
        &router,
        json_request(Method::POST, "/api/areas", Some(&buyer), area.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(
        &router,
        json_request(Method::POST, "/api/areas", Some(&admin), area),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["perks"].as_array().map(Vec::len), Some(1));

    let (status, featured) = send(&router, get("/api/areas/featured", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(featured[0]["name"], "Dubai Creek Harbour");

    let id = created["id"].as_str().unwrap();
    let (status, _) = send(&router, get(&format!("/api/areas/{}", id), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_inquiry_and_scoped_listing() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    app.user("buyer@example.com", &[]).await;
    let listing = app.property(&admin, property_draft("Loft", "100.00", None)).await;
    let router = router_for(&app);

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/properties/inquiries",
            None,
            json!({
                "property": listing.id,
                "name": "Guest",
                "email": "guest@example.com",
                "message": "Viewing on Saturday?"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, _) = send(&router, get("/api/properties/inquiries", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let buyer = token_for(&router, "buyer@example.com").await;
    let (status, page) = send(&router, get("/api/properties/inquiries", Some(&buyer))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 0);

    let staff = token_for(&router, "admin@example.com").await;
    let (_, page) = send(&router, get("/api/properties/inquiries", Some(&staff))).await;
    assert_eq!(page["meta"]["total"], 1);
}

#[tokio::test]
async fn test_toggle_favorite_over_http() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    app.user("buyer@example.com", &[]).await;
    let listing = app.property(&admin, property_draft("Loft", "100.00", None)).await;
    let router = router_for(&app);
    let buyer = token_for(&router, "buyer@example.com").await;

    let uri = format!("/api/properties/{}/toggle_favorite", listing.id);
    let (status, outcome) = send(&router, json_request(Method::POST, &uri, Some(&buyer), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "added");

    let (_, detail) = send(
        &router,
        get(&format!("/api/properties/{}", listing.id), Some(&buyer)),
    )
    .await;
    assert_eq!(detail["is_favorited"], true);

    let (_, outcome) = send(&router, json_request(Method::POST, &uri, Some(&buyer), json!({}))).await;
    assert_eq!(outcome["status"], "removed");
}

#[tokio::test]
async fn test_unknown_resources_are_not_found() {
    let app = TestApp::new().await;
    let router = router_for(&app);

    let (status, body) = send(
        &router,
        get(&format!("/api/properties/{}", uuid::Uuid::new_v4()), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&router, get("/api/market/reports/no-such-report", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Mocked container
// =============================================================================

/// Rejects every token without touching storage.
struct RejectingAuth;

#[async_trait]
impl AuthService for RejectingAuth {
    async fn register(&self, _request: RegisterUser) -> AppResult<UserResponse> {
        Err(AppError::internal("not under test"))
    }

    async fn login(&self, _email: String, _password: String) -> AppResult<TokenResponse> {
        Err(AppError::InvalidCredentials)
    }

    fn verify_token(&self, _token: &str) -> AppResult<Claims> {
        Err(AppError::Unauthorized)
    }

    async fn authenticate(&self, _token: &str) -> AppResult<Principal> {
        Err(AppError::Unauthorized)
    }
}

#[tokio::test]
async fn test_rejected_token_never_reaches_the_handler() {
    let mut container = MockServiceContainer::new();
    container
        .expect_auth()
        .times(1)
        .returning(|| Arc::new(RejectingAuth));
    container.expect_areas().never();

    let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));
    let router = create_router(AppState::new(Arc::new(container), database, 1024));

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/areas",
            Some("stale-token"),
            json!({ "name": "Ghost", "description": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

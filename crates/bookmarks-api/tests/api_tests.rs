//! API Integration Tests
//!
//! Every test drives the full router over an in-memory store, so no
//! database is needed. The PostgreSQL gateway has its own ignored tests in
//! `bookmarks-core`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bookmarks_api::auth::Claims;
use bookmarks_api::state::AppState;
use bookmarks_api::testing::{test_config, test_state, TEST_JWT_SECRET};
use bookmarks_api::{create_router, create_router_for_testing};
use jsonwebtoken::{encode, EncodingKey, Header};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Same as `create_json_request` with a bearer token attached
fn create_authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> Request<Body> {
    let mut request = create_json_request(method, uri, body);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

/// Send a request and decode the JSON body (`Value::Null` when empty)
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn signup(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        create_json_request(
            "POST",
            "/auth/signup",
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    body["accessToken"].as_str().unwrap().to_string()
}

async fn create_bookmark(app: &Router, token: &str, body: Value) -> Value {
    let (status, bookmark) =
        send(app, create_authed_request("POST", "/bookmarks", token, Some(body))).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {bookmark}");
    bookmark
}

fn decode_claims(token: &str) -> Claims {
    let key = jsonwebtoken::DecodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    jsonwebtoken::decode::<Claims>(token, &key, &jsonwebtoken::Validation::default())
        .unwrap()
        .claims
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let (status, json) = send(&app, create_json_request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["uptimeSeconds"].is_u64());
}

#[tokio::test]
async fn test_readiness_check() {
    let app = create_router_for_testing();

    let (status, json) = send(&app, create_json_request("GET", "/ready", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"]["database"], true);
}

#[tokio::test]
async fn test_openapi_spec_available() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request("GET", "/api-docs/openapi.json", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/bookmarks/{id}"].is_object());
    assert!(json["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request("GET", "/health", None))
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
}

// =============================================================================
// Signup and Login Tests
// =============================================================================

#[tokio::test]
async fn test_signup_login_then_empty_bookmarks() {
    let app = create_router_for_testing();

    let signup_token = signup(&app, "a@b.com", "Test@123").await;
    assert!(!signup_token.is_empty());

    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "a@b.com", "password": "Test@123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let login_token = body["accessToken"].as_str().unwrap();

    let (status, bookmarks) =
        send(&app, create_authed_request("GET", "/bookmarks", login_token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bookmarks, json!([]));
}

#[tokio::test]
async fn test_signup_token_claims_match_new_user() {
    let app = create_router_for_testing();
    let token = signup(&app, "claims@example.com", "Test@123").await;

    let (status, me) = send(&app, create_authed_request("GET", "/users/me", &token, None)).await;
    assert_eq!(status, StatusCode::OK);

    let claims = decode_claims(&token);
    assert_eq!(claims.user_id, me["id"].as_i64().unwrap());
    assert_eq!(claims.email, "claims@example.com");
    assert_eq!(claims.exp - claims.iat, 15 * 60);
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = create_router_for_testing();
    let first = signup(&app, "dup@example.com", "Test@123").await;

    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/signup",
            Some(json!({ "email": "dup@example.com", "password": "Other@456" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Email already in use");

    // Original account still logs in with its own password
    let (status, _) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "dup@example.com", "password": "Test@123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, me) = send(&app, create_authed_request("GET", "/users/me", &first, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "dup@example.com");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = create_router_for_testing();
    signup(&app, "known@example.com", "Test@123").await;

    let (wrong_status, wrong_body) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "known@example.com", "password": "wrong" })),
        ),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        create_json_request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "unknown@example.com", "password": "Test@123" })),
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::FORBIDDEN);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Credentials incorrect");
}

#[tokio::test]
async fn test_signup_invalid_bodies() {
    let app = create_router_for_testing();

    for body in [
        json!({ "password": "Test@123" }),
        json!({ "email": "a@b.com" }),
        json!({ "email": "", "password": "Test@123" }),
        json!({ "email": "not-an-email", "password": "Test@123" }),
        json!({ "email": "a@b.com", "password": "" }),
        json!({ "email": 42, "password": "Test@123" }),
    ] {
        let (status, json) = send(
            &app,
            create_json_request("POST", "/auth/signup", Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert_eq!(json["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_login_missing_email_is_bad_request() {
    let app = create_router_for_testing();

    let (status, _) = send(
        &app,
        create_json_request("POST", "/auth/login", Some(json!({ "password": "Test@123" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = create_router_for_testing();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/signup")
        .header("Content-Type", "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Authentication Guard Tests
// =============================================================================

#[tokio::test]
async fn test_protected_routes_without_token() {
    let app = create_router_for_testing();

    for (method, uri) in [
        ("GET", "/users/me"),
        ("PATCH", "/users"),
        ("GET", "/bookmarks"),
        ("POST", "/bookmarks"),
        ("GET", "/bookmarks/1"),
        ("PATCH", "/bookmarks/1"),
        ("DELETE", "/bookmarks/1"),
    ] {
        let (status, _) = send(&app, create_json_request(method, uri, Some(json!({})))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = create_router_for_testing();
    let token = signup(&app, "expired@example.com", "Test@123").await;
    let claims = decode_claims(&token);

    let expired = encode(
        &Header::default(),
        &Claims {
            iat: claims.iat - 3600,
            exp: claims.iat - 1800,
            ..claims
        },
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) =
        send(&app, create_authed_request("GET", "/bookmarks", &expired, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_foreign_signature_is_rejected() {
    let app = create_router_for_testing();
    let token = signup(&app, "forged@example.com", "Test@123").await;

    let forged = encode(
        &Header::default(),
        &decode_claims(&token),
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let (status, _) = send(&app, create_authed_request("GET", "/users/me", &forged, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let app = create_router_for_testing();
    let token = signup(&app, "scheme@example.com", "Test@123").await;

    let mut request = create_json_request("GET", "/users/me", None);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Token {token}").parse().unwrap(),
    );
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_removed_user_is_rejected() {
    let (state, store) = test_state();
    let app = create_router(state);
    let token = signup(&app, "gone@example.com", "Test@123").await;

    store.remove_user(decode_claims(&token).user_id).await;

    let (status, _) = send(&app, create_authed_request("GET", "/users/me", &token, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// User Profile Tests
// =============================================================================

#[tokio::test]
async fn test_me_hides_password() {
    let app = create_router_for_testing();
    let token = signup(&app, "me@example.com", "Test@123").await;

    let (status, me) = send(&app, create_authed_request("GET", "/users/me", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "me@example.com");
    assert!(me.get("password").is_none());
    assert!(me.get("passwordHash").is_none());
    assert!(!me.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_edit_user() {
    let app = create_router_for_testing();
    let token = signup(&app, "edit@example.com", "Test@123").await;

    let (status, user) = send(
        &app,
        create_authed_request(
            "PATCH",
            "/users",
            &token,
            Some(json!({ "firstName": "Vladimir", "email": " edited@example.com " })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["firstName"], "Vladimir");
    assert_eq!(user["email"], "edited@example.com");
    assert_eq!(user["lastName"], Value::Null);
    assert!(user.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_edit_user_to_taken_email() {
    let app = create_router_for_testing();
    signup(&app, "first@example.com", "Test@123").await;
    let token = signup(&app, "second@example.com", "Test@123").await;

    let (status, _) = send(
        &app,
        create_authed_request(
            "PATCH",
            "/users",
            &token,
            Some(json!({ "email": "first@example.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_edit_user_invalid_email() {
    let app = create_router_for_testing();
    let token = signup(&app, "valid@example.com", "Test@123").await;

    let (status, _) = send(
        &app,
        create_authed_request("PATCH", "/users", &token, Some(json!({ "email": "nope" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Bookmark Tests
// =============================================================================

#[tokio::test]
async fn test_bookmark_round_trip() {
    let app = create_router_for_testing();
    let token = signup(&app, "owner@example.com", "Test@123").await;
    let owner_id = decode_claims(&token).user_id;

    let created = create_bookmark(
        &app,
        &token,
        json!({
            "title": "Kubernetes Course",
            "description": "Learn how to use Kubernetes",
            "link": "https://www.youtube.com/watch?v=d6WC5n9G_sM",
        }),
    )
    .await;

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(
        &app,
        create_authed_request("GET", &format!("/bookmarks/{id}"), &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(fetched["userId"], owner_id);
    assert_eq!(fetched["title"], "Kubernetes Course");
    assert_eq!(fetched["description"], "Learn how to use Kubernetes");
    assert_eq!(fetched["link"], "https://www.youtube.com/watch?v=d6WC5n9G_sM");

    let mut keys: Vec<&str> = fetched.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        ["createdAt", "description", "id", "link", "title", "updatedAt", "userId"]
    );

    let (status, listed) =
        send(&app, create_authed_request("GET", "/bookmarks", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn test_create_bookmark_invalid_bodies() {
    let app = create_router_for_testing();
    let token = signup(&app, "invalid@example.com", "Test@123").await;

    for body in [
        json!({ "link": "https://example.com" }),
        json!({ "title": "No link" }),
        json!({ "title": "", "link": "https://example.com" }),
        json!({ "title": "t", "link": "" }),
        json!({ "title": 1, "link": "https://example.com" }),
    ] {
        let (status, _) = send(
            &app,
            create_authed_request("POST", "/bookmarks", &token, Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
    }
}

#[tokio::test]
async fn test_unknown_fields_are_stripped() {
    let app = create_router_for_testing();
    let alice = signup(&app, "alice@example.com", "Test@123").await;
    let bob = signup(&app, "bob@example.com", "Test@123").await;
    let bob_id = decode_claims(&bob).user_id;

    let created = create_bookmark(
        &app,
        &alice,
        json!({ "title": "Mine", "link": "https://example.com", "userId": bob_id, "id": 999 }),
    )
    .await;

    assert_ne!(created["userId"], bob_id);
    assert_ne!(created["id"], 999);

    let (_, bobs) = send(&app, create_authed_request("GET", "/bookmarks", &bob, None)).await;
    assert_eq!(bobs, json!([]));
}

#[tokio::test]
async fn test_edit_bookmark_changes_only_title() {
    let app = create_router_for_testing();
    let token = signup(&app, "editor@example.com", "Test@123").await;
    let created = create_bookmark(
        &app,
        &token,
        json!({ "title": "Old", "description": "Keep me", "link": "https://example.com" }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, edited) = send(
        &app,
        create_authed_request(
            "PATCH",
            &format!("/bookmarks/{id}"),
            &token,
            Some(json!({ "title": "X" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["title"], "X");
    assert_eq!(edited["link"], created["link"]);
    assert_eq!(edited["description"], created["description"]);
    assert_eq!(edited["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn test_other_users_bookmark_is_not_found() {
    let app = create_router_for_testing();
    let alice = signup(&app, "alice@example.com", "Test@123").await;
    let bob = signup(&app, "bob@example.com", "Test@123").await;

    let created = create_bookmark(
        &app,
        &alice,
        json!({ "title": "Private", "link": "https://example.com" }),
    )
    .await;
    let uri = format!("/bookmarks/{}", created["id"]);

    let (get_status, get_body) = send(&app, create_authed_request("GET", &uri, &bob, None)).await;
    let (patch_status, _) = send(
        &app,
        create_authed_request("PATCH", &uri, &bob, Some(json!({ "title": "Stolen" }))),
    )
    .await;
    let (delete_status, _) = send(&app, create_authed_request("DELETE", &uri, &bob, None)).await;

    assert_eq!(get_status, StatusCode::BAD_REQUEST);
    assert_eq!(patch_status, StatusCode::BAD_REQUEST);
    assert_eq!(delete_status, StatusCode::BAD_REQUEST);

    // Indistinguishable from an id nobody owns
    let (_, missing_body) =
        send(&app, create_authed_request("GET", "/bookmarks/999999", &bob, None)).await;
    assert_eq!(get_body, missing_body);

    let (status, still) = send(&app, create_authed_request("GET", &uri, &alice, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(still["title"], "Private");
}

#[tokio::test]
async fn test_delete_then_get() {
    let app = create_router_for_testing();
    let token = signup(&app, "deleter@example.com", "Test@123").await;
    let created = create_bookmark(
        &app,
        &token,
        json!({ "title": "Temp", "link": "https://example.com" }),
    )
    .await;
    let uri = format!("/bookmarks/{}", created["id"]);

    let response = app
        .clone()
        .oneshot(create_authed_request("DELETE", &uri, &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());

    let (status, body) = send(&app, create_authed_request("GET", &uri, &token, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bookmark not found");

    let (status, _) = send(&app, create_authed_request("DELETE", &uri, &token, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listed) = send(&app, create_authed_request("GET", "/bookmarks", &token, None)).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_non_numeric_bookmark_id() {
    let app = create_router_for_testing();
    let token = signup(&app, "parse@example.com", "Test@123").await;

    let (status, body) =
        send(&app, create_authed_request("GET", "/bookmarks/abc", &token, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

// =============================================================================
// Request Body Limit Tests
// =============================================================================

fn router_with_body_limit(max_body_size: usize) -> Router {
    let mut config = test_config();
    config.server.max_body_size = max_body_size;
    let store = Arc::new(bookmarks_core::MemoryStore::new());
    create_router(Arc::new(AppState::new(config, store).unwrap()))
}

fn padded_signup(email: &str, padding: usize) -> String {
    json!({ "email": email, "password": "pw", "padding": "x".repeat(padding) }).to_string()
}

#[tokio::test]
async fn test_body_over_configured_limit_is_413() {
    let app = router_with_body_limit(256);
    let body = padded_signup("big@example.com", 1024);

    let with_length = Request::builder()
        .method("POST")
        .uri("/auth/signup")
        .header("Content-Type", "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body.clone()))
        .unwrap();
    let response = app.clone().oneshot(with_length).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // No Content-Length: the limit trips while the JSON extractor buffers
    let (status, json) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/auth/signup")
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_configured_limit_above_two_mib_is_honored() {
    let app = router_with_body_limit(4 << 20);
    let body = padded_signup("roomy@example.com", 3 << 20);

    let (status, json) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/auth/signup")
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {json}");
    assert!(json["accessToken"].is_string());
}

// =============================================================================
// Email Normalization Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_padded_email_signs_up_trimmed(
        local in "[a-z][a-z0-9]{0,11}",
        domain in "[a-z]{1,10}",
        left in "[ \t]{0,4}",
        right in "[ \t]{0,4}",
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let app = create_router_for_testing();
            let email = format!("{local}@{domain}.com");

            let token = signup(&app, &format!("{left}{email}{right}"), "Test@123").await;
            prop_assert_eq!(decode_claims(&token).email, email.clone());

            let (status, _) = send(
                &app,
                create_json_request(
                    "POST",
                    "/auth/login",
                    Some(json!({ "email": email, "password": "Test@123" })),
                ),
            )
            .await;
            prop_assert_eq!(status, StatusCode::OK);
            Ok(())
        })?;
    }
}

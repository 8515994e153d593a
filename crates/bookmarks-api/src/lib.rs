//! Bookmarks API - REST server
//!
//! Email and password accounts, short-lived bearer tokens and per-user
//! bookmark storage over HTTP and JSON.

pub mod audit;
pub mod auth;
pub mod bookmarks;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use bookmarks_core::config::ServerConfig;
use state::AppState;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Build the application router around shared state
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = state.config.server.clone();

    let router = routes::api_routes(state.clone())
        .with_state(state)
        // `max_body_size` replaces axum's built-in 2 MiB extractor limit
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server.max_body_size))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http());

    match cors_layer(&server) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// CORS for the configured origins; `None` when no origin is configured
fn cors_layer(server: &ServerConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

/// In-memory wiring for tests
#[cfg(feature = "test-utils")]
pub mod testing {
    use crate::state::AppState;
    use bookmarks_core::config::{AppConfig, PasswordConfig};
    use bookmarks_core::MemoryStore;
    use std::sync::Arc;

    pub const TEST_JWT_SECRET: &str = "test-secret-key-for-integration-tests";

    /// Defaults with a fixed secret and cheap Argon2 parameters
    pub fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
        config.auth.password = PasswordConfig {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        };
        config
    }

    /// State over a fresh `MemoryStore`, returned alongside for direct access
    pub fn test_state() -> (Arc<AppState>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(test_config(), store.clone())
            .expect("test Argon2 parameters are valid");
        (Arc::new(state), store)
    }
}

/// Router over an empty in-memory store
#[cfg(feature = "test-utils")]
pub fn create_router_for_testing() -> Router {
    let (state, _) = testing::test_state();
    create_router(state)
}

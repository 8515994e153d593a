//! API route definitions

use crate::auth::middleware::auth_middleware;
use crate::handlers::{auth, bookmarks, health, users};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

/// Every route the service exposes
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api-docs/openapi.json", get(openapi_json));

    // Protected routes (valid access token for an existing user)
    let protected_routes = Router::new()
        .route("/users/me", get(users::me_handler))
        .route("/users", patch(users::edit_user_handler))
        .route(
            "/bookmarks",
            get(bookmarks::list_bookmarks).post(bookmarks::create_bookmark),
        )
        .route(
            "/bookmarks/:id",
            get(bookmarks::get_bookmark)
                .patch(bookmarks::edit_bookmark)
                .delete(bookmarks::delete_bookmark),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

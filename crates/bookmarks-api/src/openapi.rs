//! OpenAPI document served at `/api-docs/openapi.json`

use crate::auth::{AuthRequest, AuthResponse};
use crate::bookmarks::{CreateBookmarkRequest, EditBookmarkRequest};
use crate::error::ApiError;
use crate::handlers::{
    self,
    health::{HealthResponse, ReadinessChecks, ReadinessResponse},
};
use crate::users::EditUserRequest;
use bookmarks_core::{Bookmark, UserPublic};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookmarks API",
        description = "Per-user bookmark storage behind email and password accounts"
    ),
    paths(
        handlers::auth::signup_handler,
        handlers::auth::login_handler,
        handlers::users::me_handler,
        handlers::users::edit_user_handler,
        handlers::bookmarks::list_bookmarks,
        handlers::bookmarks::create_bookmark,
        handlers::bookmarks::get_bookmark,
        handlers::bookmarks::edit_bookmark,
        handlers::bookmarks::delete_bookmark,
        handlers::health::health_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        AuthRequest,
        AuthResponse,
        UserPublic,
        EditUserRequest,
        Bookmark,
        CreateBookmarkRequest,
        EditBookmarkRequest,
        ApiError,
        HealthResponse,
        ReadinessResponse,
        ReadinessChecks,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Signup and login"),
        (name = "users", description = "Current user profile"),
        (name = "bookmarks", description = "Bookmarks owned by the caller"),
        (name = "health", description = "Liveness and readiness checks"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

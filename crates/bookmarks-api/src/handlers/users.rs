//! Current user handlers

use crate::audit::ClientInfo;
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::ValidatedJson;
use crate::state::AppState;
use crate::users::EditUserRequest;
use axum::{extract::State, Extension, Json};
use bookmarks_core::UserPublic;
use std::sync::Arc;

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserPublic),
        (status = 401, description = "Not authenticated", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me_handler(Extension(current): Extension<AuthenticatedUser>) -> Json<UserPublic> {
    Json(current.user)
}

/// Update the authenticated user's profile
#[utoipa::path(
    patch,
    path = "/users",
    tag = "users",
    request_body = EditUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserPublic),
        (status = 400, description = "Invalid request body", body = crate::error::ApiError),
        (status = 401, description = "Not authenticated", body = crate::error::ApiError),
        (status = 403, description = "Email already in use", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn edit_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthenticatedUser>,
    client: ClientInfo,
    ValidatedJson(request): ValidatedJson<EditUserRequest>,
) -> Result<Json<UserPublic>, AppError> {
    let user = state.users.edit(&current.user, request, &client).await?;
    Ok(Json(user))
}

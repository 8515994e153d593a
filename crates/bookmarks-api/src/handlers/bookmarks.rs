//! Bookmark handlers
//!
//! All routes sit behind the auth guard and act on the caller's bookmarks
//! only. Another user's bookmark id yields the same 400 as an unknown one.

use crate::auth::AuthenticatedUser;
use crate::bookmarks::{CreateBookmarkRequest, EditBookmarkRequest};
use crate::error::AppError;
use crate::extract::{PathId, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use bookmarks_core::Bookmark;
use std::sync::Arc;

/// List the caller's bookmarks
#[utoipa::path(
    get,
    path = "/bookmarks",
    tag = "bookmarks",
    responses(
        (status = 200, description = "Owned bookmarks", body = Vec<Bookmark>),
        (status = 401, description = "Not authenticated", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Bookmark>>, AppError> {
    let bookmarks = state.bookmarks.list(current.id()).await?;
    Ok(Json(bookmarks))
}

#[utoipa::path(
    post,
    path = "/bookmarks",
    tag = "bookmarks",
    request_body = CreateBookmarkRequest,
    responses(
        (status = 201, description = "Bookmark created", body = Bookmark),
        (status = 400, description = "Invalid request body", body = crate::error::ApiError),
        (status = 401, description = "Not authenticated", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_bookmark(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateBookmarkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let bookmark = state.bookmarks.create(current.id(), request).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

#[utoipa::path(
    get,
    path = "/bookmarks/{id}",
    tag = "bookmarks",
    params(("id" = i64, Path, description = "Bookmark id")),
    responses(
        (status = 200, description = "Bookmark", body = Bookmark),
        (status = 400, description = "Bookmark not found", body = crate::error::ApiError),
        (status = 401, description = "Not authenticated", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_bookmark(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthenticatedUser>,
    PathId(id): PathId,
) -> Result<Json<Bookmark>, AppError> {
    let bookmark = state.bookmarks.get_by_id(current.id(), id).await?;
    Ok(Json(bookmark))
}

/// Change some fields of a bookmark
#[utoipa::path(
    patch,
    path = "/bookmarks/{id}",
    tag = "bookmarks",
    params(("id" = i64, Path, description = "Bookmark id")),
    request_body = EditBookmarkRequest,
    responses(
        (status = 200, description = "Updated bookmark", body = Bookmark),
        (status = 400, description = "Invalid body or bookmark not found", body = crate::error::ApiError),
        (status = 401, description = "Not authenticated", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn edit_bookmark(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthenticatedUser>,
    PathId(id): PathId,
    ValidatedJson(request): ValidatedJson<EditBookmarkRequest>,
) -> Result<Json<Bookmark>, AppError> {
    let bookmark = state.bookmarks.edit_by_id(current.id(), id, request).await?;
    Ok(Json(bookmark))
}

#[utoipa::path(
    delete,
    path = "/bookmarks/{id}",
    tag = "bookmarks",
    params(("id" = i64, Path, description = "Bookmark id")),
    responses(
        (status = 204, description = "Bookmark deleted"),
        (status = 400, description = "Bookmark not found", body = crate::error::ApiError),
        (status = 401, description = "Not authenticated", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_bookmark(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthenticatedUser>,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    state.bookmarks.delete_by_id(current.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

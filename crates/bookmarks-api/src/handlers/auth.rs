//! Authentication API handlers

use crate::audit::ClientInfo;
use crate::auth::{AuthRequest, AuthResponse};
use crate::error::AppError;
use crate::extract::ValidatedJson;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// Create an account and receive an access token
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = AuthRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request body", body = crate::error::ApiError),
        (status = 403, description = "Email already in use", body = crate::error::ApiError),
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    ValidatedJson(request): ValidatedJson<AuthRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth.signup(request, &client).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange credentials for an access token
///
/// Unknown email and wrong password get the same 403 response.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid request body", body = crate::error::ApiError),
        (status = 403, description = "Credentials incorrect", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    ValidatedJson(request): ValidatedJson<AuthRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.auth.login(request, &client).await?;
    Ok(Json(response))
}

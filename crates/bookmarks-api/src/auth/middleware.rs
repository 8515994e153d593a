//! Authentication middleware for protecting routes
//!
//! Verifies the bearer token from the Authorization header, then loads the
//! user it names. On success the public user record is placed in request
//! extensions for handlers to pick up with `Extension<AuthenticatedUser>`.

use super::jwt::TokenError;
use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::{ApiError, AppError};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use bookmarks_core::{StoreError, UserPublic, UserStore};
use std::sync::Arc;
use thiserror::Error;

/// The caller behind a verified access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Current profile, loaded fresh for this request
    pub user: UserPublic,
}

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// Authentication middleware errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    /// Token verified but its user is gone
    #[error("Token subject no longer exists")]
    UnknownUser,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingAuthHeader => "Missing Authorization header",
            AuthError::InvalidAuthHeader => "Invalid Authorization header format",
            AuthError::InvalidToken(_) | AuthError::UnknownUser => "Invalid or expired token",
            AuthError::Store(err) => return AppError::Store(err).into_response(),
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new("UNAUTHORIZED", message)),
        )
            .into_response()
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
///
/// The scheme name is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Authentication middleware that requires a valid access token
///
/// ```ignore
/// let protected = Router::new()
///     .route("/users/me", get(get_me))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let client = ClientInfo::from_headers(request.headers());
    let token = bearer_token(request.headers())?;

    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            audit_log(&AuditEvent::InvalidToken {
                reason: e.to_string(),
                client,
            });
            return Err(AuthError::InvalidToken(e));
        }
    };

    // A signed token outlives a deleted account; the row is authoritative
    let Some(user) = state.store.find_user_by_id(claims.user_id).await? else {
        audit_log(&AuditEvent::InvalidToken {
            reason: format!("user {} no longer exists", claims.user_id),
            client,
        });
        return Err(AuthError::UnknownUser);
    };

    tracing::debug!(user_id = user.id, token_id = %claims.jti, "Request authenticated");
    request
        .extensions_mut()
        .insert(AuthenticatedUser { user: user.into() });

    Ok(next.run(request).await)
}

//! User profile service

use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::{map_user_write_error, AppError};
use crate::extract::trimmed_opt;
use bookmarks_core::{Store, UserPatch, UserPublic, UserStore};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Body of `PATCH /users`; absent fields stay as they are
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(
        length(min = 1, message = "email should not be empty"),
        email(message = "email must be an email")
    )]
    pub email: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,
}

impl From<EditUserRequest> for UserPatch {
    fn from(request: EditUserRequest) -> Self {
        Self {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
        }
    }
}

/// User profile service
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Update the caller's own profile
    ///
    /// Moving to an email another account holds fails with
    /// `AppError::EmailInUse`. An empty body writes nothing and returns the
    /// stored profile.
    pub async fn edit(
        &self,
        current: &UserPublic,
        request: EditUserRequest,
        client: &ClientInfo,
    ) -> Result<UserPublic, AppError> {
        let patch = UserPatch::from(request);
        let email_changed = patch
            .email
            .as_deref()
            .is_some_and(|email| email != current.email);

        let user = if patch.is_empty() {
            self.store.find_user_by_id(current.id).await?
        } else {
            self.store
                .update_user(current.id, patch)
                .await
                .map_err(map_user_write_error)?
        }
        .ok_or(AppError::Unauthenticated)?;

        audit_log(&AuditEvent::ProfileUpdated {
            user_id: user.id,
            email_changed,
            client: client.clone(),
        });

        Ok(user.into())
    }
}

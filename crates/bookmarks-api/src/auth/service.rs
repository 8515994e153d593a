//! Authentication service layer
//!
//! Signup and login both finish in `sign_token`, so the token shape and
//! lifetime are decided in exactly one place.

use super::jwt::TokenIssuer;
use super::password::{CredentialHasher, PasswordError};
use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::{map_user_write_error, AppError};
use crate::extract::trimmed;
use bookmarks_core::{NewUser, Store, User, UserStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Signup and login request body
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct AuthRequest {
    /// Surrounding whitespace is removed before validation
    #[serde(deserialize_with = "trimmed")]
    #[validate(
        length(min = 1, message = "email should not be empty"),
        email(message = "email must be an email")
    )]
    #[schema(example = "a@b.com")]
    pub email: String,

    #[validate(length(min = 1, message = "password should not be empty"))]
    #[schema(example = "Test@123")]
    pub password: String,
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token returned by signup and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
    /// Verified against when the email is unknown, so both login failures
    /// cost one Argon2 run
    dummy_hash: Arc<str>,
}

impl AuthService {
    /// Fails only if the hasher cannot produce the dummy hash
    pub fn new(
        store: Arc<dyn Store>,
        hasher: CredentialHasher,
        tokens: TokenIssuer,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash("bookmarks-unknown-account")?.into();
        Ok(Self {
            store,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    /// Register a new user and return an access token
    ///
    /// A taken email fails with `AppError::EmailInUse`; the existing account
    /// is left untouched.
    pub async fn signup(
        &self,
        request: AuthRequest,
        client: &ClientInfo,
    ) -> Result<AuthResponse, AppError> {
        let email = request.email.trim().to_string();
        let password_hash = self.hash_password(request.password).await?;

        let user = match self
            .store
            .create_user(NewUser {
                email: email.clone(),
                password_hash,
            })
            .await
        {
            Ok(user) => user,
            Err(err) => {
                let err = map_user_write_error(err);
                if matches!(err, AppError::EmailInUse) {
                    audit_log(&AuditEvent::SignupRejected {
                        email,
                        reason: err.to_string(),
                        client: client.clone(),
                    });
                }
                return Err(err);
            }
        };

        audit_log(&AuditEvent::SignupSuccess {
            user_id: user.id,
            email: user.email.clone(),
            client: client.clone(),
        });

        self.sign_token(&user)
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password are separate errors here but render
    /// identically to the caller, and both run one password verification.
    pub async fn login(
        &self,
        request: AuthRequest,
        client: &ClientInfo,
    ) -> Result<AuthResponse, AppError> {
        let email = request.email.trim().to_string();

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            self.verify_password(self.dummy_hash.to_string(), request.password)
                .await?;
            audit_log(&AuditEvent::LoginFailure {
                email,
                reason: "unknown email".to_string(),
                client: client.clone(),
            });
            return Err(AppError::UserNotFound);
        };

        let matches = self
            .verify_password(user.password_hash.clone(), request.password)
            .await?;
        if !matches {
            audit_log(&AuditEvent::LoginFailure {
                email,
                reason: "wrong password".to_string(),
                client: client.clone(),
            });
            return Err(AppError::InvalidCredentials);
        }

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id,
            email: user.email.clone(),
            client: client.clone(),
        });

        self.sign_token(&user)
    }

    fn sign_token(&self, user: &User) -> Result<AuthResponse, AppError> {
        let access_token = self
            .tokens
            .issue(user.id, &user.email)
            .map_err(|e| AppError::Internal(format!("Failed to generate access token: {e}")))?;

        Ok(AuthResponse { access_token })
    }

    // Argon2 is deliberately slow; keep it off the async workers.
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {e}")))?
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    async fn verify_password(&self, hash: String, password: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {e}")))?
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

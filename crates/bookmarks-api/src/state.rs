//! Application state management

use crate::auth::{AuthService, CredentialHasher, PasswordError, TokenIssuer};
use crate::bookmarks::BookmarkService;
use crate::users::UserService;
use bookmarks_core::config::AppConfig;
use bookmarks_core::Store;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Data store gateway shared by every service
    pub store: Arc<dyn Store>,
    /// Access token signer, also used by the auth guard
    pub tokens: TokenIssuer,
    pub auth: AuthService,
    pub users: UserService,
    pub bookmarks: BookmarkService,
}

impl AppState {
    /// Wire the services around one store and the configured secrets
    ///
    /// Fails only when the configured Argon2 parameters are out of range.
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, PasswordError> {
        let tokens = TokenIssuer::new(&config.auth);
        let hasher = CredentialHasher::new(&config.auth.password)?;

        Ok(Self {
            auth: AuthService::new(store.clone(), hasher, tokens.clone())?,
            users: UserService::new(store.clone()),
            bookmarks: BookmarkService::new(store.clone()),
            tokens,
            store,
            start_time: Instant::now(),
            config,
        })
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

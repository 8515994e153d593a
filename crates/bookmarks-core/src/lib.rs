//! Bookmarks core
//!
//! Domain records, configuration and the data store gateway shared by the
//! HTTP service. Every bookmark read or mutation goes through a store method
//! keyed by `(id, owner_id)`, so a bookmark owned by someone else looks
//! exactly like one that does not exist.

pub mod config;
pub mod models;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use models::{Bookmark, BookmarkPatch, NewBookmark, NewUser, User, UserPatch, UserPublic};
pub use store::PgStore;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;

/// Unique constraint on `users.email`
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// Foreign key from `bookmarks.user_id` to `users.id`
pub const BOOKMARKS_USER_ID_FKEY: &str = "bookmarks_user_id_fkey";

// ============================================================================
// Errors
// ============================================================================

/// Data store errors
///
/// Constraint violations are split out by name so callers can translate the
/// ones they expect into domain errors; everything else is a fault.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn is_unique_violation(&self, name: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == name)
    }

    pub fn is_foreign_key_violation(&self, name: &str) -> bool {
        matches!(self, StoreError::ForeignKeyViolation { constraint } if constraint == name)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

// ============================================================================
// Gateway traits
// ============================================================================

/// User table access
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a taken email fails with `UniqueViolation(USERS_EMAIL_KEY)`
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Apply a profile patch; `None` if the user no longer exists
    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>>;
}

/// Bookmark table access, always scoped to an owner
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn list_bookmarks(&self, owner_id: i64) -> Result<Vec<Bookmark>>;

    async fn find_bookmark(&self, owner_id: i64, id: i64) -> Result<Option<Bookmark>>;

    /// Insert a bookmark; an unknown owner fails with
    /// `ForeignKeyViolation(BOOKMARKS_USER_ID_FKEY)`
    async fn create_bookmark(&self, owner_id: i64, bookmark: NewBookmark) -> Result<Bookmark>;

    /// `None` if no row matches `(id, owner_id)`
    async fn update_bookmark(
        &self,
        owner_id: i64,
        id: i64,
        patch: BookmarkPatch,
    ) -> Result<Option<Bookmark>>;

    /// `false` if no row matched `(id, owner_id)`
    async fn delete_bookmark(&self, owner_id: i64, id: i64) -> Result<bool>;
}

/// The single persistence access point
#[async_trait]
pub trait Store: UserStore + BookmarkStore {
    /// Cheap round trip used by readiness checks
    async fn ping(&self) -> Result<()>;
}

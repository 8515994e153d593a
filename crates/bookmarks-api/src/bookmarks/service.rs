//! Bookmark service layer
//!
//! Every operation is keyed by the caller's id. A bookmark that belongs to
//! somebody else fails exactly like one that was never created.

use crate::error::{map_bookmark_write_error, AppError};
use bookmarks_core::{Bookmark, BookmarkPatch, BookmarkStore, NewBookmark, Store};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Body of `POST /bookmarks`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookmarkRequest {
    #[validate(length(min = 1, message = "title should not be empty"))]
    #[schema(example = "Rust book")]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "link should not be empty"))]
    #[schema(example = "https://doc.rust-lang.org/book/")]
    pub link: String,
}

impl From<CreateBookmarkRequest> for NewBookmark {
    fn from(request: CreateBookmarkRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            link: request.link,
        }
    }
}

/// Body of `PATCH /bookmarks/{id}`; absent fields stay as they are
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EditBookmarkRequest {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub link: Option<String>,
}

impl From<EditBookmarkRequest> for BookmarkPatch {
    fn from(request: EditBookmarkRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            link: request.link,
        }
    }
}

/// Bookmark service
#[derive(Clone)]
pub struct BookmarkService {
    store: Arc<dyn Store>,
}

impl BookmarkService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All bookmarks owned by `owner_id`
    pub async fn list(&self, owner_id: i64) -> Result<Vec<Bookmark>, AppError> {
        Ok(self.store.list_bookmarks(owner_id).await?)
    }

    pub async fn get_by_id(&self, owner_id: i64, bookmark_id: i64) -> Result<Bookmark, AppError> {
        self.owned(owner_id, bookmark_id).await
    }

    pub async fn create(
        &self,
        owner_id: i64,
        request: CreateBookmarkRequest,
    ) -> Result<Bookmark, AppError> {
        let bookmark = self
            .store
            .create_bookmark(owner_id, request.into())
            .await
            .map_err(map_bookmark_write_error)?;

        tracing::debug!(owner_id, bookmark_id = bookmark.id, "Bookmark created");
        Ok(bookmark)
    }

    /// Apply a partial update to an owned bookmark
    pub async fn edit_by_id(
        &self,
        owner_id: i64,
        bookmark_id: i64,
        request: EditBookmarkRequest,
    ) -> Result<Bookmark, AppError> {
        let current = self.owned(owner_id, bookmark_id).await?;

        let patch = BookmarkPatch::from(request);
        if patch.is_empty() {
            return Ok(current);
        }

        // The row may vanish between the check and the write
        self.store
            .update_bookmark(owner_id, bookmark_id, patch)
            .await?
            .ok_or(AppError::BookmarkNotFound)
    }

    /// Permanently remove an owned bookmark
    pub async fn delete_by_id(&self, owner_id: i64, bookmark_id: i64) -> Result<(), AppError> {
        self.owned(owner_id, bookmark_id).await?;

        if !self.store.delete_bookmark(owner_id, bookmark_id).await? {
            return Err(AppError::BookmarkNotFound);
        }

        tracing::debug!(owner_id, bookmark_id, "Bookmark deleted");
        Ok(())
    }

    async fn owned(&self, owner_id: i64, bookmark_id: i64) -> Result<Bookmark, AppError> {
        self.store
            .find_bookmark(owner_id, bookmark_id)
            .await?
            .ok_or(AppError::BookmarkNotFound)
    }
}

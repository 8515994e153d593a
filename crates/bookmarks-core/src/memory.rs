//! In-memory store for tests
//!
//! Enforces the same constraints as the PostgreSQL schema and reports them
//! under the same constraint names.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{
    Bookmark, BookmarkPatch, BookmarkStore, NewBookmark, NewUser, Result, Store, StoreError, User,
    UserPatch, UserStore, BOOKMARKS_USER_ID_FKEY, USERS_EMAIL_KEY,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    bookmarks: BTreeMap<i64, Bookmark>,
    next_user_id: i64,
    next_bookmark_id: i64,
}

/// Store backed by ordered maps behind a single lock
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user and, like `ON DELETE CASCADE`, their bookmarks
    pub async fn remove_user(&self, id: i64) -> bool {
        let mut tables = self.tables.write().await;
        tables.bookmarks.retain(|_, b| b.user_id != id);
        tables.users.remove(&id).is_some()
    }

    /// Remove a bookmark regardless of owner
    pub async fn remove_bookmark(&self, id: i64) -> bool {
        self.tables.write().await.bookmarks.remove(&id).is_some()
    }
}

fn email_taken() -> StoreError {
    StoreError::UniqueViolation {
        constraint: USERS_EMAIL_KEY.to_string(),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(email_taken());
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: tables.next_user_id,
            email: user.email,
            password_hash: user.password_hash,
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &patch.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(email_taken());
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(first_name) = patch.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = Some(last_name);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl BookmarkStore for MemoryStore {
    async fn list_bookmarks(&self, owner_id: i64) -> Result<Vec<Bookmark>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookmarks
            .values()
            .filter(|b| b.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_bookmark(&self, owner_id: i64, id: i64) -> Result<Option<Bookmark>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookmarks
            .get(&id)
            .filter(|b| b.user_id == owner_id)
            .cloned())
    }

    async fn create_bookmark(&self, owner_id: i64, bookmark: NewBookmark) -> Result<Bookmark> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: BOOKMARKS_USER_ID_FKEY.to_string(),
            });
        }

        tables.next_bookmark_id += 1;
        let now = Utc::now();
        let created = Bookmark {
            id: tables.next_bookmark_id,
            user_id: owner_id,
            title: bookmark.title,
            description: bookmark.description,
            link: bookmark.link,
            created_at: now,
            updated_at: now,
        };
        tables.bookmarks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_bookmark(
        &self,
        owner_id: i64,
        id: i64,
        patch: BookmarkPatch,
    ) -> Result<Option<Bookmark>> {
        let mut tables = self.tables.write().await;
        let Some(bookmark) = tables
            .bookmarks
            .get_mut(&id)
            .filter(|b| b.user_id == owner_id)
        else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            bookmark.title = title;
        }
        if let Some(description) = patch.description {
            bookmark.description = Some(description);
        }
        if let Some(link) = patch.link {
            bookmark.link = link;
        }
        bookmark.updated_at = Utc::now();
        Ok(Some(bookmark.clone()))
    }

    async fn delete_bookmark(&self, owner_id: i64, id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .bookmarks
            .get(&id)
            .is_some_and(|b| b.user_id == owner_id);
        if owned {
            tables.bookmarks.remove(&id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

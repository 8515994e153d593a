//! PostgreSQL data store
//!
//! Users and bookmarks live in two tables created by the embedded
//! migrations. Bookmark statements always filter on both `id` and
//! `user_id`.

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::{
    Bookmark, BookmarkPatch, BookmarkStore, NewBookmark, NewUser, Result, Store, StoreError, User,
    UserPatch, UserStore,
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, created_at, updated_at";
const BOOKMARK_COLUMNS: &str = "id, user_id, title, description, link, created_at, updated_at";

/// Translate a driver error into a `StoreError`
///
/// Only unique and foreign key violations are singled out, keyed by the
/// constraint name the database reports. Every other failure is passed
/// through untouched.
pub fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default().to_string();
        match db_err.kind() {
            ErrorKind::UniqueViolation => return StoreError::UniqueViolation { constraint },
            ErrorKind::ForeignKeyViolation => {
                return StoreError::ForeignKeyViolation { constraint }
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

/// PostgreSQL store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a connection pool
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        tracing::info!(max_connections = config.max_connections, "PostgreSQL pool ready");
        Ok(Self { pool })
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let query = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>> {
        let query = format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(patch.email)
            .bind(patch.first_name)
            .bind(patch.last_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl BookmarkStore for PgStore {
    async fn list_bookmarks(&self, owner_id: i64) -> Result<Vec<Bookmark>> {
        let query = format!("SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_bookmark(&self, owner_id: i64, id: i64) -> Result<Option<Bookmark>> {
        let query =
            format!("SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn create_bookmark(&self, owner_id: i64, bookmark: NewBookmark) -> Result<Bookmark> {
        let query = format!(
            "INSERT INTO bookmarks (user_id, title, description, link) VALUES ($1, $2, $3, $4) RETURNING {BOOKMARK_COLUMNS}"
        );
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(owner_id)
            .bind(&bookmark.title)
            .bind(&bookmark.description)
            .bind(&bookmark.link)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_bookmark(
        &self,
        owner_id: i64,
        id: i64,
        patch: BookmarkPatch,
    ) -> Result<Option<Bookmark>> {
        let query = format!(
            r#"
            UPDATE bookmarks SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                link = COALESCE($5, link),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {BOOKMARK_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.link)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_bookmark(&self, owner_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::users::repo_types::{NewUser, User, UserChanges};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Sole owner of the connection pool for the `users` table.
#[derive(Clone)]
pub struct UserRepo {
    pool: SqlitePool,
}

impl UserRepo {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Single-connection in-memory database with the schema applied.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;
        let repo = Self::from_pool(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    #[cfg(test)]
    pub(crate) async fn close(&self) {
        self.pool.close().await;
    }

    /// Create or upgrade the schema from the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Insert a user; id and timestamps are assigned here.
    pub async fn create(&self, new: &NewUser) -> Result<User, StoreError> {
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, age, permissions, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, username, email, age, permissions, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(new.age)
        .bind(&new.permissions)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(user_id = user.id, "user row inserted");
        Ok(user)
    }

    /// Fetch a live (not soft-deleted) user.
    pub async fn get_by_id(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, age, permissions, created_at, updated_at, deleted_at
            FROM users
            WHERE id = ? AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Overwrite the provided fields and bump `updated_at`.
    ///
    /// Matching no live row is not an error; callers that need a not-found
    /// signal look the user up first.
    pub async fn update_by_id(&self, id: i64, changes: &UserChanges) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET username    = COALESCE(?, username),
                   email       = COALESCE(?, email),
                   age         = COALESCE(?, age),
                   permissions = COALESCE(?, permissions),
                   updated_at  = ?
             WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.age)
        .bind(changes.permissions.as_deref())
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .execute(&self.pool)
        .await?;

        debug!(user_id = id, rows = result.rows_affected(), "user row updated");
        Ok(())
    }

    /// Soft-delete: stamp `deleted_at`, keep the row.
    pub async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET deleted_at = ?
             WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .execute(&self.pool)
        .await?;

        debug!(user_id = id, rows = result.rows_affected(), "user row soft-deleted");
        Ok(())
    }
}

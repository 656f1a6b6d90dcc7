//! # User Repository
//!
//! PostgreSQL implementation of [`UserStore`].
//!
//! ## Query Patterns
//!
//! | Pattern | Example |
//! |---------|---------|
//! | Returning | `INSERT ... RETURNING *` (to get generated fields) |
//! | Parameterized | Always `$1, $2` (never string interpolation) |
//! | Unique violation | constraint name checked, mapped to `DuplicateUsername` |
//!
//! ## Error Handling
//!
//! | sqlx outcome | ApiError variant | HTTP Status |
//! |--------------------|-----------------------|-------------|
//! | no rows (update/delete) | `UserNotFound` | 404 |
//! | unique constraint | `DuplicateUsername` | 409 |
//! | other | `DatabaseError` | 500 |

use async_trait::async_trait;
use shared::errors::ApiError;
use sqlx::PgPool;
use tracing::info;

use super::UserStore;
use crate::domain::{NewUser, User};

/// PostgreSQL-backed user store.
///
/// # Thread Safety
///
/// `PgUserStore` is `Send + Sync` because `PgPool` internally uses `Arc`.
/// It can be safely shared across async tasks and Actix-web workers.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    /// PostgreSQL connection pool
    pool: PgPool,
}

impl PgUserStore {
    /// Creates a new store instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Maps a unique-constraint violation on the username to the domain
    /// error, anything else to a storage error.
    fn map_unique_violation(e: sqlx::Error) -> ApiError {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.constraint() == Some("users_username_key") {
                return ApiError::DuplicateUsername;
            }
        }
        ApiError::DatabaseError(e)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        info!(username = %new_user.username, "Creating user");

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, is_admin)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(new_user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_unique_violation)?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_username(&self, id: i64, new_name: &str) -> Result<(), ApiError> {
        info!(user_id = id, new_name = %new_name, "Updating username");

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(new_name)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Self::map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::UserNotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::UserNotFound);
        }

        Ok(())
    }

    async fn is_admin(&self, id: i64) -> Result<Option<bool>, ApiError> {
        let row: Option<(bool,)> = sqlx::query_as("SELECT is_admin FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(is_admin,)| is_admin))
    }
}

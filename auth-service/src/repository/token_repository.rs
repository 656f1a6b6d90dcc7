//! # Refresh Token Repository
//!
//! PostgreSQL implementation of [`RefreshStore`].
//!
//! Revocation is a flag flip, never a row rewrite back to valid: once
//! `revoked = TRUE` a record only leaves the table through the expiry
//! sweep or an explicit rollback delete.

use async_trait::async_trait;
use shared::errors::ApiError;
use sqlx::PgPool;
use tracing::info;

use super::RefreshStore;
use crate::domain::{NewRefreshToken, RefreshTokenRecord};

/// PostgreSQL-backed refresh credential store.
#[derive(Debug, Clone)]
pub struct PgRefreshStore {
    /// PostgreSQL connection pool
    pool: PgPool,
}

impl PgRefreshStore {
    /// Creates a new store instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshStore for PgRefreshStore {
    async fn create(&self, record: NewRefreshToken) -> Result<RefreshTokenRecord, ApiError> {
        let stored = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(record.user_id)
        .bind(&record.token)
        .bind(record.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, ApiError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT * FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke(&self, token: &str) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = $1 AND NOT revoked
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        info!(
            user_id = user_id,
            revoked = result.rows_affected(),
            "Revoked all refresh tokens for user"
        );

        Ok(result.rows_affected())
    }

    async fn delete(&self, token: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

//! # Comment Repository
//!
//! Database operations for comments.

use shared::errors::ApiError;
use sqlx::PgPool;

use crate::domain::{Comment, NewComment};

/// Repository for comment database operations.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a comment and return the stored row.
    pub async fn create(&self, comment: NewComment) -> Result<Comment, ApiError> {
        let stored = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, username, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.author_name)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Fetch a comment by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, ApiError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    /// List the comments under a post, oldest first.
    pub async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>, ApiError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE post_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Rewrite a comment's content.
    ///
    /// Returns `false` when no row matched.
    pub async fn update(&self, id: i64, content: &str) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET content = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(content)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a comment.
    ///
    /// Returns `false` when no row matched.
    pub async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all comments, oldest first.
    pub async fn list(&self) -> Result<Vec<Comment>, ApiError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}

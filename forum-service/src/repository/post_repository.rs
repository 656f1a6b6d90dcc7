//! # Post Repository
//!
//! Database operations for forum posts. The comment count is computed per
//! read with a correlated subquery rather than maintained as a counter.

use shared::errors::ApiError;
use sqlx::PgPool;

use crate::domain::{NewPost, Post};

/// Repository for post database operations.
#[derive(Debug, Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a post and return the stored row.
    pub async fn create(&self, post: NewPost) -> Result<Post, ApiError> {
        let stored = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, author_id, username)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(&post.author_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Fetch a post by id, with its comment count.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Post>, ApiError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.*,
                   (SELECT COUNT(*) FROM comments WHERE post_id = p.id) AS comment_count
            FROM posts p
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Rewrite a post's title and content.
    ///
    /// Returns `false` when no row matched.
    pub async fn update(&self, id: i64, title: &str, content: &str) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, content = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a post (comments cascade).
    ///
    /// Returns `false` when no row matched.
    pub async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all posts, newest first.
    pub async fn list(&self) -> Result<Vec<Post>, ApiError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.*,
                   (SELECT COUNT(*) FROM comments WHERE post_id = p.id) AS comment_count
            FROM posts p
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }
}

//! # Forum Service
//!
//! Business logic for posts and comments: input gates, not-found mapping,
//! and repository orchestration. Author identity on create operations is
//! taken from the RPC payload - the gateway has already replaced any
//! client-supplied value with the authenticated identity.

use shared::errors::ApiError;
use tracing::info;

use crate::domain::{Comment, NewComment, NewPost, Post};
use crate::repository::{CommentRepository, PostRepository};

/// Service for post and comment business logic.
#[derive(Clone)]
pub struct ForumService {
    posts: PostRepository,
    comments: CommentRepository,
}

impl ForumService {
    /// Create a new service instance.
    pub fn new(posts: PostRepository, comments: CommentRepository) -> Self {
        Self { posts, comments }
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Create a post.
    pub async fn create_post(&self, post: NewPost) -> Result<Post, ApiError> {
        Self::require_not_blank(&post.title, "Title")?;
        Self::require_not_blank(&post.content, "Content")?;

        info!(author_id = post.author_id, title = %post.title, "Creating post");

        self.posts.create(post).await
    }

    /// Fetch a post by id.
    pub async fn get_post(&self, id: i64) -> Result<Post, ApiError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound { resource: format!("post:{}", id) })
    }

    /// Update a post's title and content.
    pub async fn update_post(&self, id: i64, title: &str, content: &str) -> Result<Post, ApiError> {
        Self::require_not_blank(title, "Title")?;
        Self::require_not_blank(content, "Content")?;

        if !self.posts.update(id, title, content).await? {
            return Err(ApiError::NotFound { resource: format!("post:{}", id) });
        }

        self.get_post(id).await
    }

    /// Delete a post and its comments.
    pub async fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        if !self.posts.delete(id).await? {
            return Err(ApiError::NotFound { resource: format!("post:{}", id) });
        }

        info!(post_id = id, "Post deleted");

        Ok(())
    }

    /// List all posts, newest first.
    pub async fn posts(&self) -> Result<Vec<Post>, ApiError> {
        self.posts.list().await
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Create a comment under an existing post.
    pub async fn create_comment(&self, comment: NewComment) -> Result<Comment, ApiError> {
        Self::require_not_blank(&comment.content, "Content")?;

        // Surface a clean 404 instead of a foreign-key violation
        self.get_post(comment.post_id).await?;

        info!(
            post_id = comment.post_id,
            author_id = comment.author_id,
            "Creating comment"
        );

        self.comments.create(comment).await
    }

    /// Fetch a comment by id.
    pub async fn get_comment(&self, id: i64) -> Result<Comment, ApiError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound { resource: format!("comment:{}", id) })
    }

    /// List the comments under a post, oldest first.
    pub async fn comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.comments.find_by_post_id(post_id).await
    }

    /// Update a comment's content.
    pub async fn update_comment(&self, id: i64, content: &str) -> Result<Comment, ApiError> {
        Self::require_not_blank(content, "Content")?;

        if !self.comments.update(id, content).await? {
            return Err(ApiError::NotFound { resource: format!("comment:{}", id) });
        }

        self.get_comment(id).await
    }

    /// Delete a comment.
    pub async fn delete_comment(&self, id: i64) -> Result<(), ApiError> {
        if !self.comments.delete(id).await? {
            return Err(ApiError::NotFound { resource: format!("comment:{}", id) });
        }

        Ok(())
    }

    /// List all comments, oldest first.
    pub async fn comments(&self) -> Result<Vec<Comment>, ApiError> {
        self.comments.list().await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn require_not_blank(value: &str, field: &str) -> Result<(), ApiError> {
        if value.trim().is_empty() {
            return Err(ApiError::Validation {
                message: format!("{} must not be empty", field),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

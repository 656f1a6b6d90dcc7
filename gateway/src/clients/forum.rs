//! # Forum Service Client
//!
//! One method per forum RPC. Create operations take the authenticated
//! identity explicitly - the handler layer fills it in from the request
//! context, never from client input.

use shared::errors::ApiError;
use std::time::Duration;

use super::RpcClient;
use crate::dto::{ChatMessageDto, CommentDto, PostDto};
use crate::middleware::AuthenticatedUser;

/// HTTP client for the forum service.
#[derive(Debug, Clone)]
pub struct ForumClient {
    rpc: RpcClient,
}

impl ForumClient {
    /// Creates a client for the given base URL.
    pub fn new(base_url: &str, request_timeout: Duration) -> Self {
        Self {
            rpc: RpcClient::new("forum", base_url, request_timeout),
        }
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// `CreatePost` with server-assigned author identity.
    pub async fn create_post(
        &self,
        author: &AuthenticatedUser,
        title: &str,
        content: &str,
    ) -> Result<PostDto, ApiError> {
        self.rpc
            .post_json(
                "/api/v1/posts",
                &serde_json::json!({
                    "title": title,
                    "content": content,
                    "author_id": author.user_id,
                    "username": author.username,
                }),
            )
            .await
    }

    /// `GetPost`
    pub async fn get_post(&self, id: i64) -> Result<PostDto, ApiError> {
        self.rpc.get_json(&format!("/api/v1/posts/{}", id)).await
    }

    /// `DeletePost`
    pub async fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        self.rpc.delete(&format!("/api/v1/posts/{}", id)).await
    }

    /// `Posts` (list)
    pub async fn list_posts(&self) -> Result<Vec<PostDto>, ApiError> {
        self.rpc.get_json("/api/v1/posts").await
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// `CreateComment` with server-assigned author identity.
    pub async fn create_comment(
        &self,
        author: &AuthenticatedUser,
        post_id: i64,
        content: &str,
    ) -> Result<CommentDto, ApiError> {
        self.rpc
            .post_json(
                "/api/v1/comments",
                &serde_json::json!({
                    "post_id": post_id,
                    "content": content,
                    "author_id": author.user_id,
                    "username": author.username,
                }),
            )
            .await
    }

    /// `GetCommentByID`
    pub async fn get_comment(&self, id: i64) -> Result<CommentDto, ApiError> {
        self.rpc.get_json(&format!("/api/v1/comments/{}", id)).await
    }

    /// `GetByPostID`
    pub async fn comments_by_post(&self, post_id: i64) -> Result<Vec<CommentDto>, ApiError> {
        self.rpc
            .get_json(&format!("/api/v1/comments/post/{}", post_id))
            .await
    }

    /// `DeleteComment`
    pub async fn delete_comment(&self, id: i64) -> Result<(), ApiError> {
        self.rpc.delete(&format!("/api/v1/comments/{}", id)).await
    }

    // =========================================================================
    // Chat
    // =========================================================================

    /// `SendMessage` with server-assigned author identity.
    pub async fn send_message(
        &self,
        author: &AuthenticatedUser,
        content: &str,
    ) -> Result<ChatMessageDto, ApiError> {
        self.rpc
            .post_json(
                "/api/v1/chat/messages",
                &serde_json::json!({
                    "user_id": author.user_id,
                    "username": author.username,
                    "content": content,
                }),
            )
            .await
    }

    /// `GetMessages`
    pub async fn get_messages(&self) -> Result<Vec<ChatMessageDto>, ApiError> {
        self.rpc.get_json("/api/v1/chat/messages").await
    }
}

// =============================================================================
// Tests
// =============================================================================

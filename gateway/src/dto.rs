//! # Gateway Wire Types
//!
//! Request bodies accepted from external clients and the response shapes
//! relayed from the internal services.
//!
//! Server-assigned fields (`author_id`, `user_id`, display names) never
//! appear in the external request types: the gateway fills them in from the
//! authenticated identity before forwarding, so nothing a client sends can
//! impersonate another author.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// =============================================================================
// External request bodies
// =============================================================================

/// `POST /register`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
}

/// `POST /login`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `POST /refresh`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// `POST /api/logout`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogoutRequest {
    #[validate(length(min = 1, message = "Access token is required"))]
    pub access_token: String,
}

/// `POST /api/posts` - author identity is server-assigned.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// `POST /api/comments` - author identity is server-assigned.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub post_id: i64,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// `POST /api/chat` - author identity is server-assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct SendChatRequest {
    /// Length bounds are enforced by the forum service
    pub content: String,
}

// =============================================================================
// Relayed response shapes
// =============================================================================

/// Token pair from register/refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry as Unix seconds
    pub expires_at: i64,
}

/// Public user data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Token pair plus user, from login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: UserDto,
}

/// Identity triple from token validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
    pub is_valid: bool,
}

/// Generic confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A forum post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDto {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub comment_count: i64,
}

/// A comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// `GET /api/profile` response, built from the request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

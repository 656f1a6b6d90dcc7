//! # Data Transfer Objects (DTOs)
//!
//! Request/response shapes of the forum service's RPC surface. The gateway
//! is the only intended caller; it has already authenticated the request
//! and replaced any client-supplied author identity with the authenticated
//! one, so `author_id`/`username` here are trusted fields.

use serde::{Deserialize, Serialize};
use validator::Validate;

// =============================================================================
// POSTS
// =============================================================================

/// Request body for post creation.
///
/// Whitespace-only fields pass the length rules here and are caught by the
/// service layer's blank gate.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Authenticated author (assigned by the gateway)
    pub author_id: i64,

    /// Authenticated display name (assigned by the gateway)
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
}

/// Request body for a post update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

// =============================================================================
// COMMENTS
// =============================================================================

/// Request body for comment creation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub post_id: i64,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Authenticated author (assigned by the gateway)
    pub author_id: i64,

    /// Authenticated display name (assigned by the gateway)
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
}

/// Request body for a comment update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

// =============================================================================
// CHAT
// =============================================================================

/// Request body for sending a chat message over HTTP.
///
/// Length bounds are enforced by the chat service so the HTTP path and the
/// WebSocket path share one gate.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Authenticated author (assigned by the gateway)
    pub user_id: i64,

    /// Authenticated display name (assigned by the gateway)
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    pub content: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Health check payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_post_fields_rejected() {
        let request = CreatePostRequest {
            title: String::new(),
            content: "body".to_string(),
            author_id: 1,
            username: "alice".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_valid_post_accepted() {
        let request = CreatePostRequest {
            title: "Hello".to_string(),
            content: "body".to_string(),
            author_id: 1,
            username: "alice".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}

//! # Forum Domain Entities
//!
//! Persistent business objects: posts, their comments, and the live chat
//! log. Author display names are denormalized onto every row so reads never
//! need a lookup against the auth service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// POSTS
// =============================================================================

/// A forum post.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    /// Unique numeric identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
    /// Author's user id (server-assigned from the authenticated identity)
    pub author_id: i64,
    /// Author's display name at creation time
    #[sqlx(rename = "username")]
    #[serde(rename = "username")]
    pub author_name: String,
    /// Creation timestamp (server-assigned)
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp, if any
    pub updated_at: Option<DateTime<Utc>>,
    /// Number of comments under this post
    #[sqlx(default)]
    pub comment_count: i64,
}

/// Data required to create a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author_name: String,
}

// =============================================================================
// COMMENTS
// =============================================================================

/// A comment under a post.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    /// Unique numeric identifier
    pub id: i64,
    /// Post this comment belongs to
    pub post_id: i64,
    /// Author's user id (server-assigned from the authenticated identity)
    pub author_id: i64,
    /// Author's display name at creation time
    #[sqlx(rename = "username")]
    #[serde(rename = "username")]
    pub author_name: String,
    /// Comment body
    pub content: String,
    /// Creation timestamp (server-assigned)
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp, if any
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data required to create a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub content: String,
}

// =============================================================================
// CHAT MESSAGES
// =============================================================================

/// A single chat line.
///
/// Serialized form doubles as the WebSocket broadcast frame, so the field
/// names here are wire format.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Unique numeric identifier
    pub id: i64,
    /// Author's user id
    pub user_id: i64,
    /// Author's display name at send time
    pub username: String,
    /// Message body (`0 < len <= chat.max_message_length`)
    pub content: String,
    /// Persist timestamp, monotonically assigned by the database
    pub created_at: DateTime<Utc>,
}

/// Data required to persist a chat message.
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub user_id: i64,
    pub username: String,
    pub content: String,
}

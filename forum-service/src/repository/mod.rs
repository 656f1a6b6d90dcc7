//! # Repositories
//!
//! Database access for the forum service.
//!
//! The chat log sits behind the [`MessageStore`] capability trait so the
//! chat service and hub can be unit-tested against an in-memory store; the
//! post and comment repositories are plain sqlx wrappers.

mod comment_repository;
mod message_repository;
mod post_repository;

pub use comment_repository::CommentRepository;
pub use message_repository::PgMessageStore;
pub use post_repository::PostRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::ApiError;

use crate::domain::{ChatMessage, NewChatMessage};

// =============================================================================
// MESSAGE STORE
// =============================================================================

/// Persistence contract for the chat log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persists a message; the creation timestamp is assigned at persist
    /// time. Returns the stored row.
    async fn save(&self, message: NewChatMessage) -> Result<ChatMessage, ApiError>;

    /// Lists the full message log in chronological order.
    async fn list(&self) -> Result<Vec<ChatMessage>, ApiError>;

    /// Deletes every message created before `cutoff`; returns how many rows
    /// went. Called by the retention sweeper.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError>;
}

//! # Chat Service
//!
//! Business logic for the live chat: content validation, persistence and
//! retention. The WebSocket hub and the HTTP chat endpoints both call
//! through here, so the length gates hold no matter how a message arrives.

use chrono::{Duration, Utc};
use shared::errors::ApiError;
use std::sync::Arc;
use tracing::info;

use crate::domain::{ChatMessage, NewChatMessage};
use crate::repository::MessageStore;

/// Service for chat business logic.
#[derive(Clone)]
pub struct ChatService {
    /// Chat log persistence
    store: Arc<dyn MessageStore>,
    /// Maximum accepted message length in characters
    max_message_length: usize,
    /// Retention window for persisted messages
    message_lifetime: Duration,
}

impl ChatService {
    /// Create a new service instance.
    pub fn new(
        store: Arc<dyn MessageStore>,
        max_message_length: usize,
        message_lifetime_seconds: u64,
    ) -> Self {
        Self {
            store,
            max_message_length,
            message_lifetime: Duration::seconds(message_lifetime_seconds as i64),
        }
    }

    /// Validates and persists a chat message.
    ///
    /// The creation timestamp is assigned at persist time. Returns the
    /// stored row, which is also the broadcast payload.
    ///
    /// # Errors
    ///
    /// - `ApiError::EmptyMessage` for empty content
    /// - `ApiError::MessageTooLong` past the configured maximum
    pub async fn send(
        &self,
        user_id: i64,
        username: &str,
        content: &str,
    ) -> Result<ChatMessage, ApiError> {
        if content.is_empty() {
            return Err(ApiError::EmptyMessage);
        }
        if content.chars().count() > self.max_message_length {
            return Err(ApiError::MessageTooLong { max: self.max_message_length });
        }

        info!(user_id = user_id, content_len = content.len(), "Persisting chat message");

        self.store
            .save(NewChatMessage {
                user_id,
                username: username.to_string(),
                content: content.to_string(),
            })
            .await
    }

    /// The full message log in chronological order.
    pub async fn history(&self) -> Result<Vec<ChatMessage>, ApiError> {
        self.store.list().await
    }

    /// Deletes messages older than the retention window.
    ///
    /// Called by the periodic sweeper; deletions are not broadcast.
    pub async fn sweep_expired(&self) -> Result<u64, ApiError> {
        let cutoff = Utc::now() - self.message_lifetime;
        self.store.delete_older_than(cutoff).await
    }
}

// =============================================================================
// Tests
// =============================================================================

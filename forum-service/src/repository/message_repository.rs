//! # Chat Message Repository
//!
//! PostgreSQL implementation of [`MessageStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::ApiError;
use sqlx::PgPool;
use tracing::info;

use super::MessageStore;
use crate::domain::{ChatMessage, NewChatMessage};

/// PostgreSQL-backed chat log.
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Create a new store instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn save(&self, message: NewChatMessage) -> Result<ChatMessage, ApiError> {
        let stored = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (user_id, username, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(message.user_id)
        .bind(&message.username)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<ChatMessage>, ApiError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM chat_messages
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!(
                deleted = result.rows_affected(),
                cutoff = %cutoff,
                "Deleted old chat messages"
            );
        }

        Ok(result.rows_affected())
    }
}

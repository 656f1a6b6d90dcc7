//! # Store Contracts
//!
//! Capability traits over the persistence layer. The service layer depends
//! only on these traits, so the core can be unit-tested against in-memory
//! implementations while production wires in the PostgreSQL ones.
//!
//! | Trait | Table | Postgres impl |
//! |-------|-------|---------------|
//! | [`UserStore`] | `users` | [`PgUserStore`] |
//! | [`RefreshStore`] | `refresh_tokens` | [`PgRefreshStore`] |

mod token_repository;
mod user_repository;

pub use token_repository::PgRefreshStore;
pub use user_repository::PgUserStore;

use async_trait::async_trait;
use shared::errors::ApiError;

use crate::domain::{NewRefreshToken, NewUser, RefreshTokenRecord, User};

// =============================================================================
// USER STORE
// =============================================================================

/// Persistence contract for user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user and returns the stored row.
    ///
    /// Fails with `ApiError::DuplicateUsername` when the display name is
    /// already taken.
    async fn create(&self, new_user: NewUser) -> Result<User, ApiError>;

    /// Looks a user up by numeric identifier.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError>;

    /// Looks a user up by display name.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    /// Renames a user.
    ///
    /// Fails with `ApiError::UserNotFound` when no row matches and
    /// `ApiError::DuplicateUsername` on a name collision.
    async fn update_username(&self, id: i64, new_name: &str) -> Result<(), ApiError>;

    /// Deletes a user row.
    ///
    /// Fails with `ApiError::UserNotFound` when no row matches.
    async fn delete(&self, id: i64) -> Result<(), ApiError>;

    /// Reads the admin flag, `None` when the user does not exist.
    async fn is_admin(&self, id: i64) -> Result<Option<bool>, ApiError>;
}

// =============================================================================
// REFRESH STORE
// =============================================================================

/// Persistence contract for long-lived refresh credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshStore: Send + Sync {
    /// Persists a new refresh record (`revoked = false`).
    async fn create(&self, record: NewRefreshToken) -> Result<RefreshTokenRecord, ApiError>;

    /// Looks a record up by the exact credential string.
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, ApiError>;

    /// Marks one record revoked. Revoking an absent or already-revoked
    /// record is a no-op.
    async fn revoke(&self, token: &str) -> Result<(), ApiError>;

    /// Marks every live record of the user revoked; returns how many rows
    /// changed. Used by logout and by account deletion.
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, ApiError>;

    /// Removes one record entirely. Used to roll back a half-finished
    /// rotation.
    async fn delete(&self, token: &str) -> Result<(), ApiError>;

    /// Bulk-deletes records past their expiry; returns how many rows went.
    /// Called by the retention sweeper.
    async fn delete_expired(&self) -> Result<u64, ApiError>;
}

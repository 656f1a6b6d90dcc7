//! # Authentication Domain Entities
//!
//! Persistent business objects of the auth service. Entities map directly
//! to database tables.
//!
//! ## Entity Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Domain Entities                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌─────────────────────┐                                        │
//! │  │        User         │                                        │
//! │  ├─────────────────────┤                                        │
//! │  │ - id (PK)           │                                        │
//! │  │ - username (UNIQUE) │                                        │
//! │  │ - password_hash     │                                        │
//! │  │ - is_admin          │                                        │
//! │  │ - timestamps        │                                        │
//! │  └─────────┬───────────┘                                        │
//! │            │                                                    │
//! │            │ 1:N                                                │
//! │            ▼                                                    │
//! │  ┌──────────────────────┐                                       │
//! │  │  RefreshTokenRecord  │                                       │
//! │  ├──────────────────────┤                                       │
//! │  │ - id (PK)            │                                       │
//! │  │ - user_id (FK)       │                                       │
//! │  │ - token (UNIQUE)     │                                       │
//! │  │ - expires_at         │                                       │
//! │  │ - revoked            │                                       │
//! │  └──────────────────────┘                                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! - **Never expose `password_hash`**: Use [`UserProfile`] for API responses
//! - **Refresh records are revocable**: a revoked or expired record is never
//!   promoted back to valid

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// USER ENTITY
// =============================================================================

/// Complete user entity as stored in the database.
///
/// This struct maps directly to the `users` table and contains the password
/// hash. **Never expose this struct directly in API responses** - use
/// [`UserProfile`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Unique numeric identifier, assigned at creation
    pub id: i64,
    /// Display name (unique, 3-50 characters, used for login)
    pub username: String,
    /// Argon2id password hash in PHC format
    pub password_hash: String,
    /// Administrator flag
    pub is_admin: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp (rename, promotion)
    pub updated_at: Option<DateTime<Utc>>,
}

/// Public user data, safe for API responses.
///
/// Everything in [`User`] except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Unique numeric identifier
    pub id: i64,
    /// Display name
    pub username: String,
    /// Administrator flag
    pub is_admin: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Data required to create a new user.
///
/// The password must already be hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name (validated by the service layer)
    pub username: String,
    /// Argon2id hash, never the plaintext
    pub password_hash: String,
    /// Administrator flag (always false at registration)
    pub is_admin: bool,
}

// =============================================================================
// REFRESH TOKEN RECORD
// =============================================================================

/// Persisted long-lived credential.
///
/// A record is valid iff `!revoked` and `now < expires_at`. Rotation
/// revokes the old record; logout revokes every record of the subject; the
/// retention sweep deletes records past `expires_at`.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRecord {
    /// Record identifier
    pub id: i64,
    /// Owner of the credential
    pub user_id: i64,
    /// The opaque credential string (indexed for lookup)
    pub token: String,
    /// When the credential stops being exchangeable
    pub expires_at: DateTime<Utc>,
    /// When the credential was issued
    pub created_at: DateTime<Utc>,
    /// Set on rotation or logout; never cleared
    pub revoked: bool,
}

impl RefreshTokenRecord {
    /// Whether this record can still be exchanged for a new pair.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }
}

/// Data required to persist a new refresh credential.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    /// Owner of the credential
    pub user_id: i64,
    /// The opaque credential string
    pub token: String,
    /// Expiry stamped from the configured refresh TTL
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(revoked: bool, expires_in: i64) -> RefreshTokenRecord {
        RefreshTokenRecord {
            id: 1,
            user_id: 1,
            token: "tok".to_string(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
            created_at: Utc::now(),
            revoked,
        }
    }

    #[test]
    fn test_live_record_is_valid() {
        assert!(record(false, 60).is_valid(Utc::now()));
    }

    #[test]
    fn test_revoked_record_is_invalid() {
        assert!(!record(true, 60).is_valid(Utc::now()));
    }

    #[test]
    fn test_expired_record_is_invalid() {
        assert!(!record(false, -60).is_valid(Utc::now()));
    }

    #[test]
    fn test_profile_drops_password_hash() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$argon2id$...".to_string(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: None,
        };

        let profile = UserProfile::from(user.clone());

        assert_eq!(profile.id, user.id);
        assert_eq!(profile.username, user.username);
        // Serialized form must not contain the hash
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }
}

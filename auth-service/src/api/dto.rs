//! # Data Transfer Objects (DTOs)
//!
//! DTOs define the structure of data crossing the service boundary. They
//! serve as the **API contract** and handle:
//!
//! - **Request validation**: Using the `validator` crate
//! - **Deserialization**: JSON → Rust structs via `serde`
//! - **Serialization**: Rust structs → JSON for responses
//!
//! ## Validation Rules
//!
//! | Field | Rules |
//! |-------|-------|
//! | `username` | 3-50 characters |
//! | `password` | At least 4 characters |
//! | `refresh_token` / `access_token` | Non-empty |
//!
//! The service layer re-checks the same bounds on its own inputs; the DTO
//! rules reject obviously bad requests at the edge.
//!
//! ## JSON Naming Convention
//!
//! All DTOs use `snake_case` field names - the wire format the gateway
//! forwards verbatim to external clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::UserProfile;

// =============================================================================
// REGISTRATION & LOGIN
// =============================================================================

/// Request body for user registration.
///
/// # Example JSON
///
/// ```json
/// { "username": "alice", "password": "secret123" }
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, unique across all users
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Plain text password
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
}

/// Request body for user login.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Display name
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Plain text password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// =============================================================================
// TOKEN OPERATIONS
// =============================================================================

/// Request body for token refresh.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    /// The refresh token to exchange for a new pair
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Request body for token validation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidateTokenRequest {
    /// The access token to validate
    #[validate(length(min = 1, message = "Access token is required"))]
    pub access_token: String,
}

/// Request body for logout.
///
/// Logout takes the access credential; every session of its subject is
/// terminated.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogoutRequest {
    /// The caller's access token
    #[validate(length(min = 1, message = "Access token is required"))]
    pub access_token: String,
}

// =============================================================================
// USER MANAGEMENT
// =============================================================================

/// Request body for a rename.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUsernameRequest {
    /// The new display name
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Token pair issued by register and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Short-lived bearer token for API calls
    pub access_token: String,
    /// Long-lived token exchangeable for a new pair
    pub refresh_token: String,
    /// Access token expiry as Unix seconds
    pub expires_at: i64,
}

/// Token pair plus user profile, returned by login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry as Unix seconds
    pub expires_at: i64,
    /// Safe projection of the authenticated user
    pub user: UserProfileResponse,
}

/// Public user data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileResponse {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            is_admin: profile.is_admin,
            created_at: profile.created_at,
        }
    }
}

/// Identity triple returned by token validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
    /// Always `true` on a 200; failures surface as 401 errors instead
    pub is_valid: bool,
}

/// Admin flag lookup result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStatusResponse {
    pub is_admin: bool,
}

/// Generic confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

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
    fn test_register_request_bounds() {
        let ok = RegisterRequest { username: "alice".to_string(), password: "secret123".to_string() };
        assert!(ok.validate().is_ok());

        let short_name = RegisterRequest { username: "ab".to_string(), password: "secret123".to_string() };
        assert!(short_name.validate().is_err());

        let short_password = RegisterRequest { username: "alice".to_string(), password: "abc".to_string() };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_empty_tokens_rejected() {
        let refresh = RefreshTokenRequest { refresh_token: String::new() };
        assert!(refresh.validate().is_err());

        let logout = LogoutRequest { access_token: String::new() };
        assert!(logout.validate().is_err());
    }

    #[test]
    fn test_profile_response_from_domain() {
        let profile = UserProfile {
            id: 7,
            username: "carol".to_string(),
            is_admin: true,
            created_at: Utc::now(),
        };

        let dto = UserProfileResponse::from(profile.clone());
        assert_eq!(dto.id, 7);
        assert_eq!(dto.username, "carol");
        assert!(dto.is_admin);
    }
}

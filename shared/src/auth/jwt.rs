//! # Signed Bearer Credentials
//!
//! Handles generation and validation of the signed tokens (JWT) that carry
//! identity between the services.
//!
//! ## Token Structure
//!
//! A credential is a compact string in three dot-separated parts:
//!
//! ```text
//! xxxxx.yyyyy.zzzzz
//! ├────┼─────┼────┤
//! │    │     │    └── Signature (verifies integrity)
//! │    │     └─────── Payload (claims - the actual data)
//! │    └───────────── Header (algorithm and token type)
//! ```
//!
//! ## Our Token Implementation
//!
//! We use two types of tokens, always issued together as a pair:
//!
//! | Token Type | TTL | Purpose | Storage |
//! |------------|-----|---------|---------|
//! | Access Token | 15 min | API authorization | Client memory only |
//! | Refresh Token | 30 days | Get new token pair | Client + `refresh_tokens` table |
//!
//! ### Why Two Tokens?
//!
//! - **Access tokens** are short-lived to minimize damage if leaked
//! - **Refresh tokens** allow session continuity without re-login, and are
//!   persisted server-side so they can be revoked (logout, rotation)
//!
//! ## Claims (Token Payload)
//!
//! | Claim | Type | Description |
//! |-------|------|-------------|
//! | `user_id` | integer | Subject identifier |
//! | `username` | string | Display name (denormalized) |
//! | `is_admin` | boolean | Role flag |
//! | `type` | string | `access` or `refresh` |
//! | `iat` | integer | Issued at (Unix seconds) |
//! | `exp` | integer | Expiration (Unix seconds) |
//!
//! The claim name for the token kind is `type`. A credential that spells it
//! differently (or omits any required claim, or carries a wrong-typed value)
//! fails validation as invalid.
//!
//! ## Security Notes
//!
//! - We use **HS256** (HMAC-SHA256) for signing
//! - The algorithm is pinned: credentials presenting any other algorithm are
//!   rejected, which defeats algorithm-confusion attacks
//! - Expiry is checked with zero leeway
//! - Secret key must be at least 32 characters
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::auth::jwt::JwtService;
//! use shared::config::AuthConfig;
//!
//! let jwt_service = JwtService::new(&config.auth);
//!
//! // Issue a pair after successful authentication
//! let pair = jwt_service.generate_pair(user.id, &user.username, user.is_admin)?;
//!
//! // Validate an access credential on a request
//! let claims = jwt_service.validate_access(&pair.access_token)?;
//!
//! // Extract token from Authorization header
//! let token = JwtService::extract_from_header("Bearer eyJhbGc...")?;
//! ```
//!
//! ## Related Documentation
//!
//! - [`crate::config::AuthConfig`] - Configuration options
//! - [`crate::auth::password`] - Password hashing

use crate::config::AuthConfig;
use crate::errors::ApiError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

// =============================================================================
// Claims Structure
// =============================================================================

/// Decoded payload of a bearer credential.
///
/// These are the data fields embedded in the token. All fields are verified
/// during token validation; a missing or mistyped field makes the whole
/// credential invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's numeric identifier.
    /// This is the primary way to identify which user owns this token.
    pub user_id: i64,

    /// User's display name.
    /// Denormalized into the token so downstream services don't need a
    /// user lookup for logging and chat attribution.
    pub username: String,

    /// Role flag for authorization decisions.
    pub is_admin: bool,

    /// Token type to distinguish access from refresh tokens.
    /// Prevents using a refresh token as an access token and vice versa.
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued at time as Unix timestamp.
    pub iat: i64,

    /// Expiration time as Unix timestamp (seconds since epoch).
    /// Token is invalid after this time.
    pub exp: i64,
}

// =============================================================================
// Token Type
// =============================================================================

/// Distinguishes between access and refresh tokens.
///
/// This is stored in the token itself to prevent misuse:
/// - Access tokens cannot be used to refresh
/// - Refresh tokens cannot be used for API access
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token for API authorization.
    Access,
    /// Long-lived token for obtaining new token pairs.
    Refresh,
}

// =============================================================================
// Token Pair
// =============================================================================

/// A pair of access and refresh tokens issued by a single auth event.
///
/// ## Invariants
///
/// - Both strings decode under the configured signing key
/// - Their subjects match
/// - Their types are respectively `access` and `refresh`
/// - The refresh token expires at or after `expires_at`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// The access token for API authorization.
    /// Include in requests as: `Authorization: Bearer <token>`
    pub access_token: String,

    /// The refresh token for obtaining new token pairs.
    pub refresh_token: String,

    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// JWT Service
// =============================================================================

/// Service for token generation and validation.
///
/// This is the main entry point for all token operations. It should be
/// created once at startup and shared across the application.
///
/// ## Purity
///
/// The codec does no I/O and holds no mutable state: the keys and TTLs are
/// immutable after construction, so the type is `Clone` and can be wrapped
/// in `Arc` for sharing across async tasks.
#[derive(Clone)]
pub struct JwtService {
    /// Key for signing tokens (kept secret)
    encoding_key: EncodingKey,
    /// Key for verifying signatures
    decoding_key: DecodingKey,
    /// Access token lifetime
    access_ttl: Duration,
    /// Refresh token lifetime
    refresh_ttl: Duration,
}

impl JwtService {
    /// Creates a new token service with the given configuration.
    pub fn new(config: &AuthConfig) -> Self {
        // Using from_secret for HS256 (symmetric algorithm)
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            access_ttl: Duration::seconds(config.access_token_ttl_seconds as i64),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_seconds as i64),
        }
    }

    /// Generates a token pair (access + refresh) for a user.
    ///
    /// This is called after successful registration, login or refresh.
    ///
    /// ## Returns
    ///
    /// A `TokenPair` with the access token expiry; the refresh token expiry
    /// is `now + refresh_ttl` and is persisted alongside the refresh record
    /// by the caller.
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::Internal` if token encoding fails (which shouldn't
    /// happen with a valid signing key).
    pub fn generate_pair(
        &self,
        user_id: i64,
        username: &str,
        is_admin: bool,
    ) -> Result<TokenPair, ApiError> {
        let now = Utc::now();

        let access_token =
            self.generate_token(user_id, username, is_admin, TokenType::Access, now, self.access_ttl)?;
        let refresh_token =
            self.generate_token(user_id, username, is_admin, TokenType::Refresh, now, self.refresh_ttl)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_at: now + self.access_ttl,
        })
    }

    /// Generates a single token of the specified type.
    ///
    /// Internal method used by `generate_pair`.
    fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        is_admin: bool,
        token_type: TokenType,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, ApiError> {
        let claims = Claims {
            user_id,
            username: username.to_string(),
            is_admin,
            token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        // Encode with HS256 (default header)
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| ApiError::Internal {
            message: format!("Failed to generate token: {}", e),
        })
    }

    /// Validates and decodes a token of either type.
    ///
    /// ## Validation Steps
    ///
    /// 1. Verify the HS256 signature (rejects any other algorithm)
    /// 2. Check expiration with zero leeway
    /// 3. Deserialize the claims (rejects missing or mistyped fields)
    ///
    /// ## Errors
    ///
    /// - `ApiError::TokenExpired` - Token is past its `exp`
    /// - `ApiError::TokenInvalid` - Anything else: bad signature, wrong
    ///   algorithm, malformed claims, unknown token type
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        if token.is_empty() {
            return Err(ApiError::TokenInvalid);
        }

        // Pin the algorithm; a token whose header names anything else fails
        // before the signature is even checked.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let token_data: TokenData<Claims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                _ => ApiError::TokenInvalid,
            })?;

        Ok(token_data.claims)
    }

    /// Validates and decodes an access token.
    ///
    /// Use this for authenticating API requests.
    ///
    /// ## Errors
    ///
    /// - `ApiError::TokenExpired` - Token has expired
    /// - `ApiError::TokenInvalid` - Invalid signature, format, or type
    pub fn validate_access(&self, token: &str) -> Result<Claims, ApiError> {
        let claims = self.validate(token)?;

        // Ensure this is an access token, not a refresh token
        if claims.token_type != TokenType::Access {
            return Err(ApiError::TokenInvalid);
        }

        Ok(claims)
    }

    /// Validates and decodes a refresh token.
    ///
    /// Use this when exchanging a refresh token for a new pair.
    ///
    /// ## Errors
    ///
    /// - `ApiError::TokenExpired` - Refresh token has expired
    /// - `ApiError::TokenInvalid` - Invalid signature, format, or type
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, ApiError> {
        let claims = self.validate(token)?;

        // Ensure this is a refresh token, not an access token
        if claims.token_type != TokenType::Refresh {
            return Err(ApiError::TokenInvalid);
        }

        Ok(claims)
    }

    /// The configured refresh token lifetime.
    ///
    /// The auth service uses this to stamp `expires_at` on persisted
    /// refresh records.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Extracts the token from an Authorization header.
    ///
    /// Expects the format: `Bearer <token>`
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::TokenInvalid` if the header doesn't start with
    /// "Bearer ".
    pub fn extract_from_header(auth_header: &str) -> Result<&str, ApiError> {
        auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::TokenInvalid)
    }
}

// Implement Debug manually to avoid exposing keys
impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive() // Indicates hidden fields
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test_secret_key_minimum_32_chars_required";

    /// Creates a test configuration with valid parameters.
    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            access_token_ttl_seconds: 900,
            refresh_token_ttl_seconds: 2_592_000,
            sweep_interval_seconds: 3600,
        }
    }

    fn service() -> JwtService {
        JwtService::new(&test_config())
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = service();

        let pair = service.generate_pair(1, "alice", false).unwrap();
        let claims = service.validate_access(&pair.access_token).unwrap();

        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_admin);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let service = service();

        let pair = service.generate_pair(42, "bob", true).unwrap();
        let claims = service.validate_refresh(&pair.refresh_token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "bob");
        assert!(claims.is_admin);
        assert_eq!(claims.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_pair_subjects_match_and_refresh_outlives_access() {
        let service = service();

        let pair = service.generate_pair(7, "carol", false).unwrap();
        let access = service.validate(&pair.access_token).unwrap();
        let refresh = service.validate(&pair.refresh_token).unwrap();

        assert_eq!(access.user_id, refresh.user_id);
        assert!(refresh.exp >= access.exp);
        assert_eq!(pair.expires_at.timestamp(), access.exp);
    }

    #[test]
    fn test_expiry_strictly_after_issue() {
        let service = service();
        let pair = service.generate_pair(1, "alice", false).unwrap();
        let claims = service.validate(&pair.access_token).unwrap();

        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_access_token_fails_as_refresh() {
        let service = service();
        let pair = service.generate_pair(1, "alice", false).unwrap();

        let result = service.validate_refresh(&pair.access_token);
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn test_refresh_token_fails_as_access() {
        let service = service();
        let pair = service.generate_pair(1, "alice", false).unwrap();

        let result = service.validate_access(&pair.refresh_token);
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn test_expired_token_reports_expired() {
        let service = service();
        let now = Utc::now();

        // Issue a token that expired a minute ago
        let token = service
            .generate_token(1, "alice", false, TokenType::Access, now, Duration::seconds(-60))
            .unwrap();

        let result = service.validate(&token);
        assert!(matches!(result, Err(ApiError::TokenExpired)));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let service = service();
        let pair = service.generate_pair(1, "alice", false).unwrap();

        // Flip part of the signature
        let mut tampered = pair.access_token.clone();
        tampered.pop();
        tampered.push(if pair.access_token.ends_with('a') { 'b' } else { 'a' });

        let result = service.validate(&tampered);
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn test_foreign_key_is_invalid() {
        let service = service();
        let other = JwtService::new(&AuthConfig {
            jwt_secret: "another_secret_key_of_sufficient_len".to_string(),
            ..test_config()
        });

        let pair = other.generate_pair(1, "alice", false).unwrap();

        let result = service.validate(&pair.access_token);
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn test_foreign_algorithm_is_rejected() {
        let service = service();
        let now = Utc::now();
        let claims = Claims {
            user_id: 1,
            username: "alice".to_string(),
            is_admin: false,
            token_type: TokenType::Access,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(900)).timestamp(),
        };

        // Same secret, different HMAC variant: signature verifies under
        // HS384 but the pinned-algorithm check must refuse it.
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let result = service.validate(&token);
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn test_wrong_type_claim_name_is_invalid() {
        #[derive(Serialize)]
        struct TypClaims {
            user_id: i64,
            username: String,
            is_admin: bool,
            typ: String,
            iat: i64,
            exp: i64,
        }

        let service = service();
        let now = Utc::now();
        let token = encode(
            &Header::default(),
            &TypClaims {
                user_id: 1,
                username: "alice".to_string(),
                is_admin: false,
                typ: "access".to_string(),
                iat: now.timestamp(),
                exp: (now + Duration::seconds(900)).timestamp(),
            },
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        // `typ` instead of `type` means the required claim is missing
        let result = service.validate(&token);
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn test_mistyped_claim_is_invalid() {
        #[derive(Serialize)]
        struct BadClaims {
            user_id: String, // should be an integer
            username: String,
            is_admin: bool,
            #[serde(rename = "type")]
            token_type: String,
            iat: i64,
            exp: i64,
        }

        let service = service();
        let now = Utc::now();
        let token = encode(
            &Header::default(),
            &BadClaims {
                user_id: "1".to_string(),
                username: "alice".to_string(),
                is_admin: false,
                token_type: "access".to_string(),
                iat: now.timestamp(),
                exp: (now + Duration::seconds(900)).timestamp(),
            },
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let result = service.validate(&token);
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn test_unknown_token_type_is_invalid() {
        #[derive(Serialize)]
        struct OddClaims {
            user_id: i64,
            username: String,
            is_admin: bool,
            #[serde(rename = "type")]
            token_type: String,
            iat: i64,
            exp: i64,
        }

        let service = service();
        let now = Utc::now();
        let token = encode(
            &Header::default(),
            &OddClaims {
                user_id: 1,
                username: "alice".to_string(),
                is_admin: false,
                token_type: "session".to_string(),
                iat: now.timestamp(),
                exp: (now + Duration::seconds(900)).timestamp(),
            },
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let result = service.validate(&token);
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn test_empty_token_is_invalid() {
        let result = service().validate("");
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn test_extract_from_header_valid() {
        let token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let header = format!("Bearer {}", token);

        let extracted = JwtService::extract_from_header(&header).unwrap();
        assert_eq!(extracted, token);
    }

    #[test]
    fn test_extract_from_header_invalid() {
        // Missing "Bearer " prefix
        let result = JwtService::extract_from_header("Basic dXNlcjpwYXNz");
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }
}

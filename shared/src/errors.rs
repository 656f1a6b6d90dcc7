//! # Application Error Types
//!
//! Unified error handling for all services with automatic HTTP conversion.
//!
//! ## Design Philosophy
//!
//! This module follows the "make illegal states unrepresentable" principle.
//! Each error variant maps to a specific HTTP status code and error code,
//! ensuring consistent API responses across all services.
//!
//! ## Error Categories
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ApiError Categories                            │
//! ├─────────────────────────┬───────────────────┬───────────────────────────┤
//! │ Authentication (401)    │ Authorization(403)│ Validation (400)          │
//! ├─────────────────────────┼───────────────────┼───────────────────────────┤
//! │ InvalidCredentials      │ PermissionDenied  │ Validation                │
//! │ TokenExpired            │                   │ ValidationErrors          │
//! │ TokenInvalid            │                   │ BadRequest                │
//! │ MissingAuth             │                   │ EmptyMessage              │
//! │                         │                   │ MessageTooLong            │
//! ├─────────────────────────┴───────────────────┴───────────────────────────┤
//! │ Resources (404, 409)    │ Server (500, 503)                             │
//! ├─────────────────────────┼───────────────────────────────────────────────┤
//! │ UserNotFound            │ DatabaseError                                 │
//! │ NotFound                │ Internal                                      │
//! │ DuplicateUsername       │ Upstream                                      │
//! └─────────────────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! ## HTTP Response Format
//!
//! All errors are serialized to a consistent JSON format:
//!
//! ```json
//! {
//!   "code": "DUPLICATE_USERNAME",
//!   "message": "Username already taken",
//!   "request_id": "550e8400-e29b-41d4-a716-446655440000",
//!   "details": { ... },
//!   "timestamp": "2026-01-15T10:30:00Z"
//! }
//! ```
//!
//! ## Cross-Service Error Propagation
//!
//! The gateway and the forum service call the auth service over HTTP. The
//! `code` field of [`ErrorResponse`] is stable, so an error can be rebuilt
//! on the calling side with [`ApiError::from_code`] and the original kind
//! survives the hop (expired vs invalid token stays distinguishable).
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::errors::{ApiError, ApiResult};
//!
//! async fn get_user(id: i64) -> ApiResult<User> {
//!     let user = repo.find_by_id(id)
//!         .await?                       // DatabaseError → 500
//!         .ok_or(ApiError::UserNotFound)?; // → 404
//!
//!     Ok(user)
//! }
//! ```

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for handlers and services.
///
/// Use this instead of `Result<T, ApiError>` for cleaner signatures:
///
/// ```rust,ignore
/// async fn handler() -> ApiResult<User> { ... }
/// ```
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Main Error Enum
// =============================================================================

/// Application error type with automatic HTTP status mapping.
///
/// Each variant represents a specific error condition and maps to an
/// appropriate HTTP status code. The `#[error]` attribute defines the
/// error message format.
///
/// ## Adding New Variants
///
/// When adding new error types:
/// 1. Choose the appropriate HTTP status code
/// 2. Add the variant with `#[error("...")]` for message format
/// 3. Update `status_code()` method
/// 4. Update `error_code()` method
/// 5. Update `from_code()` so the kind survives an RPC hop
/// 6. Add tests
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Validation Errors (400 Bad Request)
    // =========================================================================
    // Request is syntactically correct but semantically invalid.

    /// Input failed a domain-level check (length bounds, empty fields).
    /// Returns 400 Bad Request.
    #[error("{message}")]
    Validation {
        /// Human-readable description of what's wrong
        message: String,
    },

    /// Request body failed validation rules.
    /// Contains field-level errors from the `validator` crate.
    /// Returns 400 Bad Request with details.
    #[error("Validation error")]
    ValidationErrors(#[from] ValidationErrors),

    /// Generic bad request with custom message.
    /// Use for malformed bodies that never reach domain validation.
    /// Returns 400 Bad Request.
    #[error("Invalid request: {message}")]
    BadRequest {
        /// Human-readable description of what's wrong
        message: String,
    },

    /// Chat message with empty content.
    /// Returns 400 Bad Request.
    #[error("Message must not be empty")]
    EmptyMessage,

    /// Chat message exceeding the configured maximum length.
    /// Returns 400 Bad Request.
    #[error("Message too long (maximum {max} characters)")]
    MessageTooLong {
        /// Configured maximum message length
        max: usize,
    },

    // =========================================================================
    // Authentication Errors (401 Unauthorized)
    // =========================================================================
    // These indicate the caller is not authenticated or their credentials are
    // invalid. The client should re-authenticate.

    /// Request doesn't include required authentication header.
    /// Returns 401 Unauthorized.
    #[error("Missing authentication")]
    MissingAuth,

    /// Wrong username/password combination.
    /// Returns 401 Unauthorized.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bearer token past its expiry.
    /// Client should use its refresh token to get a new pair.
    /// Returns 401 Unauthorized.
    #[error("Token expired")]
    TokenExpired,

    /// Bearer token is malformed, has an invalid signature, the wrong type,
    /// or references a revoked session.
    /// Returns 401 Unauthorized.
    #[error("Invalid token")]
    TokenInvalid,

    // =========================================================================
    // Authorization Errors (403 Forbidden)
    // =========================================================================

    /// Authenticated user lacks permission for the requested action.
    /// Example: non-admin deleting someone else's post.
    /// Returns 403 Forbidden.
    #[error("Permission denied")]
    PermissionDenied,

    // =========================================================================
    // Resource Errors (404 Not Found, 409 Conflict)
    // =========================================================================

    /// Username lookup failed.
    /// Returns 404 Not Found.
    #[error("User not found")]
    UserNotFound,

    /// Requested resource doesn't exist.
    /// Returns 404 Not Found.
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Resource identifier (e.g., "post:123", "comment:42")
        resource: String,
    },

    /// Registration collision on the unique display name.
    /// Returns 409 Conflict.
    #[error("Username already taken")]
    DuplicateUsername,

    // =========================================================================
    // Server Errors (500 Internal Server Error, 503 Service Unavailable)
    // =========================================================================
    // These are logged as errors and monitored.
    // Details are NOT exposed to clients for security.

    /// PostgreSQL query failed.
    /// Wraps `sqlx::Error`. Details logged, generic message returned.
    /// Returns 500 Internal Server Error.
    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    /// Unspecified internal error.
    /// Use as last resort when no specific variant applies.
    /// Returns 500 Internal Server Error.
    #[error("Internal server error")]
    Internal {
        /// Internal message for logging (not exposed to client)
        message: String,
    },

    /// An internal service could not be reached.
    /// Returns 503 Service Unavailable.
    #[error("Upstream service unavailable")]
    Upstream {
        /// Name of the unreachable service
        service: String,
    },
}

// =============================================================================
// Error Methods
// =============================================================================

impl ApiError {
    /// Returns a machine-readable error code.
    ///
    /// These codes are stable and can be used by API clients for
    /// programmatic error handling. They follow the format
    /// `CATEGORY_SPECIFIC_ERROR` in SCREAMING_SNAKE_CASE, and they are the
    /// wire representation used for cross-service propagation.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let error = ApiError::InvalidCredentials;
    /// assert_eq!(error.error_code(), "INVALID_CREDENTIALS");
    /// ```
    pub fn error_code(&self) -> &'static str {
        match self {
            // Validation
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::ValidationErrors(_) => "VALIDATION_ERROR",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::MessageTooLong { .. } => "MESSAGE_TOO_LONG",
            // Authentication
            Self::MissingAuth => "MISSING_AUTH",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "TOKEN_INVALID",
            // Authorization
            Self::PermissionDenied => "PERMISSION_DENIED",
            // Resources
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DuplicateUsername => "DUPLICATE_USERNAME",
            // Server
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Upstream { .. } => "UPSTREAM_UNAVAILABLE",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// This is the source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - Client sent invalid data
            Self::Validation { .. }
            | Self::ValidationErrors(_)
            | Self::BadRequest { .. }
            | Self::EmptyMessage
            | Self::MessageTooLong { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized - Authentication required or failed
            Self::MissingAuth
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden - Authenticated but not authorized
            Self::PermissionDenied => StatusCode::FORBIDDEN,

            // 404 Not Found - Resource doesn't exist
            Self::UserNotFound | Self::NotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict - Would violate uniqueness
            Self::DuplicateUsername => StatusCode::CONFLICT,

            // 500 Internal Server Error - Something went wrong on our side
            Self::DatabaseError(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 503 Service Unavailable - Dependency is down
            Self::Upstream { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns `true` if this is a server-side error (5xx).
    ///
    /// Server errors should be:
    /// - Logged at ERROR level
    /// - Monitored and alerted
    /// - Not expose internal details to clients
    ///
    /// Client errors (4xx) are logged at WARN level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::Internal { .. } | Self::Upstream { .. }
        )
    }

    /// Rebuilds an error kind from its wire code.
    ///
    /// Used by the RPC clients in the gateway and the forum service to turn
    /// an upstream [`ErrorResponse`] back into the matching variant so the
    /// taxonomy maps one-to-one across the hop. Unknown codes collapse to
    /// [`ApiError::Internal`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let err = ApiError::from_code("TOKEN_EXPIRED", "Token expired".into());
    /// assert!(matches!(err, ApiError::TokenExpired));
    /// ```
    pub fn from_code(code: &str, message: String) -> Self {
        match code {
            "VALIDATION_ERROR" => Self::Validation { message },
            "BAD_REQUEST" => Self::BadRequest { message },
            "EMPTY_MESSAGE" => Self::EmptyMessage,
            "MESSAGE_TOO_LONG" => Self::MessageTooLong { max: 0 },
            "MISSING_AUTH" => Self::MissingAuth,
            "INVALID_CREDENTIALS" => Self::InvalidCredentials,
            "TOKEN_EXPIRED" => Self::TokenExpired,
            "TOKEN_INVALID" => Self::TokenInvalid,
            "PERMISSION_DENIED" => Self::PermissionDenied,
            "USER_NOT_FOUND" => Self::UserNotFound,
            "NOT_FOUND" => Self::NotFound { resource: message },
            "DUPLICATE_USERNAME" => Self::DuplicateUsername,
            "UPSTREAM_UNAVAILABLE" => Self::Upstream { service: message },
            _ => Self::Internal { message },
        }
    }
}

// =============================================================================
// Response Structure
// =============================================================================

/// Standard error response body for the API.
///
/// All API errors are serialized to this format for consistency.
/// This structure is returned as the JSON body of error responses and is
/// also the wire format for errors crossing service boundaries.
///
/// ## Fields
///
/// - `code`: Machine-readable error code (e.g., "DUPLICATE_USERNAME")
/// - `message`: Human-readable message (for debugging, not for UI)
/// - `request_id`: UUID for tracing requests across services
/// - `details`: Additional context (validation errors, limits, etc.)
/// - `timestamp`: When the error occurred (ISO 8601 format)
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code for programmatic handling
    pub code: String,

    /// Human-readable message (for debugging, not for user display)
    pub message: String,

    /// Request ID for tracing across services.
    /// Useful for correlating logs and support requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Additional error details (varies by error type).
    /// - ValidationErrors: Field-level errors
    /// - MessageTooLong: `max_length`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// When the error occurred (ISO 8601 format)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    /// Creates a new error response from an `ApiError`.
    ///
    /// Automatically extracts relevant details based on error type:
    /// - ValidationErrors: Includes field-level validation errors
    /// - MessageTooLong: Includes the configured limit
    pub fn new(error: &ApiError) -> Self {
        // Extract type-specific details
        let details = match error {
            ApiError::ValidationErrors(errors) => {
                Some(serde_json::to_value(errors).unwrap_or_default())
            }
            ApiError::MessageTooLong { max } => {
                Some(serde_json::json!({ "max_length": max }))
            }
            // Server errors: Don't expose internal details
            ApiError::DatabaseError(_) | ApiError::Internal { .. } | ApiError::Upstream { .. } => {
                None
            }
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            request_id: None,
            details,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Adds a request ID for tracing.
    ///
    /// The request ID should be generated at the gateway and passed through
    /// all services for distributed tracing.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

// =============================================================================
// Actix-web Integration
// =============================================================================

/// Implements Actix-web's `ResponseError` trait.
///
/// This allows returning `ApiError` directly from handlers:
///
/// ```rust,ignore
/// async fn handler() -> Result<impl Responder, ApiError> {
///     Err(ApiError::UserNotFound)
/// }
/// ```
///
/// The error is automatically converted to an HTTP response with:
/// - Appropriate status code
/// - JSON body with `ErrorResponse` structure
impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        // Delegate to our implementation
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_server_error() {
            // Full context stays in the logs, never in the response body
            tracing::error!(code = self.error_code(), error = ?self, "Request failed");
        }
        let response = ErrorResponse::new(self);
        HttpResponse::build(self.status_code()).json(response)
    }
}

// =============================================================================
// Tests
// =============================================================================

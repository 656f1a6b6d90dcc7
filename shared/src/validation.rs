//! # Request Validation Helpers
//!
//! Utilities for validating incoming request data using the `validator` crate.
//!
//! ## How Validation Works
//!
//! DTOs derive `Validate` declaratively:
//!
//! ```rust,ignore
//! use validator::Validate;
//!
//! #[derive(Validate)]
//! struct RegisterRequest {
//!     #[validate(length(min = 3, max = 50))]
//!     username: String,
//!
//!     #[validate(length(min = 4))]
//!     password: String,
//! }
//! ```
//!
//! Handlers then call [`validate_request`] before touching the service
//! layer. Failures surface as a 400 response:
//!
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "Validation error",
//!   "details": {
//!     "username": [
//!       { "code": "length", "message": "Username must be 3-50 characters" }
//!     ]
//!   }
//! }
//! ```
//!
//! Domain-level checks (the service layer re-checking bounds on its own
//! inputs) live in the services themselves; this module only covers the
//! HTTP edge.

use crate::errors::ApiError;
use validator::Validate;

// =============================================================================
// Core Validation Functions
// =============================================================================

/// Validates a request DTO that implements `Validate`.
///
/// This is the primary validation function. Use it in handlers to
/// validate incoming data.
///
/// ## Example
///
/// ```rust,ignore
/// async fn register(body: Json<RegisterRequest>) -> Result<impl Responder, ApiError> {
///     validate_request(&body)?;  // Returns early if invalid
///
///     // Continue with validated data
/// }
/// ```
///
/// ## Errors
///
/// Returns `ApiError::ValidationErrors` with field-level details if
/// validation fails.
pub fn validate_request<T: Validate>(data: &T) -> Result<(), ApiError> {
    data.validate().map_err(ApiError::ValidationErrors)
}

// =============================================================================
// Custom Validators
// =============================================================================

/// Custom validation functions for use with `#[validate(custom)]`.
///
/// These functions follow the validator crate's signature:
/// `fn(&T) -> Result<(), ValidationError>`
pub mod validators {
    use validator::ValidationError;

    /// Validates that a string is not blank (empty or whitespace-only).
    ///
    /// ## Valid Values
    ///
    /// - `"hello"` ✓
    /// - `"  hello  "` ✓ (has content)
    ///
    /// ## Invalid Values
    ///
    /// - `""` ✗
    /// - `"   "` ✗ (whitespace only)
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("blank"));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::validators::*;
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, max = 50))]
        username: String,
    }

    #[test]
    fn test_not_blank_valid() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("  hello  ").is_ok());
        assert!(not_blank("a").is_ok());
    }

    #[test]
    fn test_not_blank_invalid() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("\t\n").is_err());
    }

    #[test]
    fn test_validate_request_passes_valid_data() {
        let sample = Sample { username: "alice".to_string() };
        assert!(validate_request(&sample).is_ok());
    }

    #[test]
    fn test_validate_request_maps_to_api_error() {
        let sample = Sample { username: "ab".to_string() };
        let err = validate_request(&sample).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}

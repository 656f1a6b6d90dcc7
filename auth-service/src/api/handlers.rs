//! # Request Handlers
//!
//! HTTP request handlers that bridge the API layer with the service layer.
//! Each handler follows this pattern:
//!
//! 1. **Extract** request data using Actix extractors
//! 2. **Validate** input using the `validator` crate
//! 3. **Call** service layer methods
//! 4. **Transform** and return HTTP response
//!
//! ## Error Handling
//!
//! All handlers return `Result<HttpResponse, ApiError>`. The `ApiError` type
//! automatically converts to appropriate HTTP status codes via the
//! `ResponseError` trait implementation, and the response body carries the
//! stable error code the callers (gateway, forum service) rehydrate from.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use shared::{errors::ApiError, validation};

use crate::AppState;

use super::dto::{
    AdminStatusResponse, AuthResponse, HealthResponse, LoginRequest, LogoutRequest,
    MessageResponse, RefreshTokenRequest, RegisterRequest, TokenResponse, UpdateUsernameRequest,
    UserProfileResponse, ValidateTokenRequest, ValidateTokenResponse,
};

// =============================================================================
// HEALTH CHECK
// =============================================================================

/// Health check endpoint for monitoring and load balancers.
///
/// # Route
///
/// `GET /health`
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: "auth-service".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Registers a new user account.
///
/// # Route
///
/// `POST /api/v1/auth/register`
///
/// # Responses
///
/// - **201 Created**: Registration successful, token pair in body
/// - **400 Bad Request**: Validation failed
/// - **409 Conflict**: Username already taken
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let pair = state.auth_service.register(&body.username, &body.password).await?;

    Ok(HttpResponse::Created().json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_at: pair.expires_at.timestamp(),
    }))
}

// =============================================================================
// LOGIN
// =============================================================================

/// Authenticates a user and returns tokens plus profile.
///
/// # Route
///
/// `POST /api/v1/auth/login`
///
/// # Responses
///
/// - **200 OK**: Login successful
/// - **401 Unauthorized**: Wrong password
/// - **404 Not Found**: Unknown username
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let response = state.auth_service.login(&body.username, &body.password).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: response.tokens.access_token,
        refresh_token: response.tokens.refresh_token,
        expires_at: response.tokens.expires_at.timestamp(),
        user: UserProfileResponse::from(response.user),
    }))
}

// =============================================================================
// TOKEN REFRESH
// =============================================================================

/// Exchanges a refresh token for a new pair (rotation).
///
/// # Route
///
/// `POST /api/v1/auth/refresh`
///
/// # Responses
///
/// - **200 OK**: New pair issued; the old refresh token is dead
/// - **401 Unauthorized**: Token expired, revoked, or invalid
pub async fn refresh_token(
    state: web::Data<AppState>,
    body: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let pair = state.auth_service.refresh(&body.refresh_token).await?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_at: pair.expires_at.timestamp(),
    }))
}

// =============================================================================
// TOKEN VALIDATION
// =============================================================================

/// Validates an access token and returns the caller's identity.
///
/// Called by the gateway middleware and the forum chat hub.
///
/// # Route
///
/// `POST /api/v1/auth/validate`
///
/// # Responses
///
/// - **200 OK**: Identity triple with `is_valid: true`
/// - **401 Unauthorized**: `TOKEN_EXPIRED` or `TOKEN_INVALID`
pub async fn validate_token(
    state: web::Data<AppState>,
    body: web::Json<ValidateTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let claims = state.auth_service.validate_token(&body.access_token)?;

    Ok(HttpResponse::Ok().json(ValidateTokenResponse {
        user_id: claims.user_id,
        username: claims.username,
        is_admin: claims.is_admin,
        is_valid: true,
    }))
}

// =============================================================================
// LOGOUT
// =============================================================================

/// Terminates every session of the caller.
///
/// # Route
///
/// `POST /api/v1/auth/logout`
pub async fn logout(
    state: web::Data<AppState>,
    body: web::Json<LogoutRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    state.auth_service.logout(&body.access_token).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

// =============================================================================
// ADMIN STATUS
// =============================================================================

/// Reads a user's admin flag.
///
/// # Route
///
/// `GET /api/v1/auth/admin-status/{user_id}`
pub async fn admin_status(
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let is_admin = state.auth_service.is_admin(*user_id).await?;

    Ok(HttpResponse::Ok().json(AdminStatusResponse { is_admin }))
}

// =============================================================================
// USER MANAGEMENT
// =============================================================================

/// Renames a user.
///
/// # Route
///
/// `PUT /api/v1/auth/users/{id}`
pub async fn update_username(
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    body: web::Json<UpdateUsernameRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    state.auth_service.update_username(*user_id, &body.username).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Username updated".to_string(),
    }))
}

/// Deletes a user account and revokes all of its sessions.
///
/// # Route
///
/// `DELETE /api/v1/auth/users/{id}`
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    state.auth_service.delete_user(*user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

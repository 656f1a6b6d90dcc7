//! # Gateway Authentication Middleware
//!
//! Authenticates requests under `/api` against the auth service and makes
//! the caller's identity available to handlers.
//!
//! ## Authentication Flow
//!
//! ```text
//! ┌─────────┐    ┌──────────────┐    ┌───────────────────┐    ┌─────────┐
//! │ Request │───►│ require_auth │───►│ AuthClient        │───►│ Handler │
//! └─────────┘    │ (bearer)     │    │ .validate_token() │    │ (User)  │
//!                └──────────────┘    └───────────────────┘    └─────────┘
//! ```
//!
//! On success the identity triple is inserted into request extensions and
//! handlers receive it through the [`AuthenticatedUser`] extractor. On any
//! failure the request is answered with the 401 taxonomy error - expired
//! and invalid tokens stay distinguishable for the client.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage};
use shared::auth::JwtService;
use shared::errors::ApiError;

use crate::AppState;

// =============================================================================
// Authenticated User
// =============================================================================

/// Identity of the authenticated caller, extracted from the validated
/// access token.
///
/// ## Example
///
/// ```rust,ignore
/// async fn profile(user: AuthenticatedUser) -> impl Responder {
///     format!("Hello, {}!", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The subject's numeric identifier
    pub user_id: i64,
    /// The subject's display name
    pub username: String,
    /// Role flag for authorization checks
    pub is_admin: bool,
}

/// Extractor reading the identity placed by [`require_auth`].
///
/// Fails with `MissingAuth` if the middleware was not applied to the
/// route - a wiring error, not a client error, but 401 is still the safe
/// answer.
impl actix_web::FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::MissingAuth.into());

        std::future::ready(result)
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Authenticates a request against the auth service.
///
/// Applied to the `/api` scope with `actix_web::middleware::from_fn`:
///
/// ```rust,ignore
/// web::scope("/api")
///     .wrap(middleware::from_fn(require_auth))
/// ```
///
/// ## Errors
///
/// - `MissingAuth` - no `Authorization` header
/// - `TokenInvalid` - header is not `Bearer <token>`, or the auth service
///   rejected the token
/// - `TokenExpired` - token past its expiry
/// - `Upstream` - auth service unreachable
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::MissingAuth)?;

    let token = JwtService::extract_from_header(auth_header)?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| ApiError::Internal {
            message: "Gateway state missing from request".to_string(),
        })?;

    let identity = state.auth.validate_token(token).await?;

    // A 200 with is_valid unset would be a broken upstream; treat it as a
    // rejected token rather than letting the request through.
    if !identity.is_valid {
        return Err(ApiError::TokenInvalid.into());
    }

    req.extensions_mut().insert(AuthenticatedUser {
        user_id: identity.user_id,
        username: identity.username,
        is_admin: identity.is_admin,
    });

    next.call(req).await
}

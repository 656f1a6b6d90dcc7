//! # Route Configuration
//!
//! Defines URL patterns and maps them to handler functions.
//!
//! ## Route Structure
//!
//! ```text
//! /
//! ├── health                           GET    → health_check
//! │
//! └── api/v1/auth/
//!     ├── register                     POST   → register
//!     ├── login                        POST   → login
//!     ├── refresh                      POST   → refresh_token
//!     ├── validate                     POST   → validate_token
//!     ├── logout                       POST   → logout
//!     ├── admin-status/{user_id}       GET    → admin_status
//!     └── users/{id}                   PUT    → update_username
//!                                      DELETE → delete_user
//! ```
//!
//! ## Callers
//!
//! These endpoints form the internal RPC surface of the auth service. The
//! gateway translates the external HTTP API onto them; the forum service
//! calls `validate` for WebSocket authentication.

use actix_web::web;

use super::handlers;

/// Configures all routes for the auth service.
///
/// Called from `main.rs` during app initialization:
///
/// ```rust,ignore
/// App::new()
///     .configure(routes::configure)
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Simple endpoint for load balancers and monitoring systems.
        .route("/health", web::get().to(handlers::health_check))
        .service(
            web::scope("/api/v1/auth")
                // POST /api/v1/auth/register
                // Request: RegisterRequest { username, password }
                // Response: TokenResponse { access_token, refresh_token, expires_at }
                .route("/register", web::post().to(handlers::register))
                //
                // POST /api/v1/auth/login
                // Request: LoginRequest { username, password }
                // Response: AuthResponse { ...tokens, user }
                .route("/login", web::post().to(handlers::login))
                //
                // POST /api/v1/auth/refresh
                // Request: RefreshTokenRequest { refresh_token }
                // Response: TokenResponse (old refresh token revoked)
                .route("/refresh", web::post().to(handlers::refresh_token))
                //
                // POST /api/v1/auth/validate
                // Request: ValidateTokenRequest { access_token }
                // Response: ValidateTokenResponse { user_id, username, is_admin, is_valid }
                .route("/validate", web::post().to(handlers::validate_token))
                //
                // POST /api/v1/auth/logout
                // Request: LogoutRequest { access_token }
                // Revokes every refresh credential of the subject
                .route("/logout", web::post().to(handlers::logout))
                //
                // GET /api/v1/auth/admin-status/{user_id}
                // Response: AdminStatusResponse { is_admin }
                .route("/admin-status/{user_id}", web::get().to(handlers::admin_status))
                //
                // PUT /api/v1/auth/users/{id}     - rename
                // DELETE /api/v1/auth/users/{id}  - delete account + sessions
                .route("/users/{id}", web::put().to(handlers::update_username))
                .route("/users/{id}", web::delete().to(handlers::delete_user)),
        );
}

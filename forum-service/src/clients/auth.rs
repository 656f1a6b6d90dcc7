//! # Auth Service Client
//!
//! Validates access credentials against the auth service. The WebSocket hub
//! authenticates every connection's first frame through this client; the
//! [`TokenValidator`] trait keeps the hub testable without a live upstream.
//!
//! Upstream errors keep their kind across the hop: a non-2xx response body
//! is parsed as the shared [`ErrorResponse`] envelope and rebuilt with
//! [`ApiError::from_code`], so an expired token still reads as
//! `TOKEN_EXPIRED` here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::errors::{ApiError, ErrorResponse};
use std::time::Duration;
use tracing::warn;

/// Identity attached to an authenticated connection.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessIdentity {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

/// Capability to turn an access credential into an identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validates the token and returns the subject's identity.
    ///
    /// # Errors
    ///
    /// - `ApiError::TokenExpired` / `ApiError::TokenInvalid` from the auth
    ///   service, kind preserved
    /// - `ApiError::Upstream` when the auth service is unreachable
    async fn validate(&self, token: &str) -> Result<AccessIdentity, ApiError>;
}

// =============================================================================
// HTTP implementation
// =============================================================================

#[derive(Serialize)]
struct ValidateRequest<'a> {
    access_token: &'a str,
}

#[derive(Deserialize)]
struct ValidateResponse {
    user_id: i64,
    username: String,
    is_admin: bool,
}

/// HTTP client for the auth service's validation endpoint.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Creates a client with a per-request deadline.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized (startup-only path).
    pub fn new(base_url: &str, request_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TokenValidator for AuthClient {
    async fn validate(&self, token: &str) -> Result<AccessIdentity, ApiError> {
        let url = format!("{}/api/v1/auth/validate", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&ValidateRequest { access_token: token })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Auth service unreachable");
                ApiError::Upstream { service: "auth".to_string() }
            })?;

        if response.status().is_success() {
            let body: ValidateResponse = response.json().await.map_err(|e| ApiError::Internal {
                message: format!("Malformed validate response: {}", e),
            })?;

            return Ok(AccessIdentity {
                user_id: body.user_id,
                username: body.username,
                is_admin: body.is_admin,
            });
        }

        // Rebuild the upstream error kind from the stable wire code
        match response.json::<ErrorResponse>().await {
            Ok(body) => Err(ApiError::from_code(&body.code, body.message)),
            Err(_) => Err(ApiError::Upstream { service: "auth".to_string() }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AuthClient {
        AuthClient::new(&server.uri(), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_valid_token_yields_identity() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/validate"))
            .and(body_json(serde_json::json!({ "access_token": "good-token" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user_id": 1,
                "username": "alice",
                "is_admin": false,
                "is_valid": true
            })))
            .mount(&server)
            .await;

        let identity = client(&server).validate("good-token").await.unwrap();

        assert_eq!(
            identity,
            AccessIdentity { user_id: 1, username: "alice".to_string(), is_admin: false }
        );
    }

    #[tokio::test]
    async fn test_upstream_error_kind_survives() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/validate"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "TOKEN_EXPIRED",
                "message": "Token expired",
                "timestamp": "2026-01-15T10:30:00Z"
            })))
            .mount(&server)
            .await;

        let result = client(&server).validate("stale-token").await;
        assert!(matches!(result, Err(ApiError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_unreachable_auth_service_is_upstream_error() {
        // Nothing is listening on this port
        let client = AuthClient::new("http://127.0.0.1:1", Duration::from_millis(200));

        let result = client.validate("any").await;
        assert!(matches!(result, Err(ApiError::Upstream { .. })));
    }
}

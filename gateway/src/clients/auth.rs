//! # Auth Service Client
//!
//! One method per auth RPC. Error kinds from the auth service survive the
//! hop (see [`super::RpcClient`]), so an expired token still surfaces to
//! the external client as `TOKEN_EXPIRED`, not a generic failure.

use shared::errors::ApiError;
use std::time::Duration;

use super::RpcClient;
use crate::dto::{AuthResponse, MessageResponse, TokenResponse, ValidateResponse};

/// HTTP client for the auth service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    rpc: RpcClient,
}

impl AuthClient {
    /// Creates a client for the given base URL.
    pub fn new(base_url: &str, request_timeout: Duration) -> Self {
        Self {
            rpc: RpcClient::new("auth", base_url, request_timeout),
        }
    }

    /// `Register(name, password) → (access, refresh, expires_at)`
    pub async fn register(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        self.rpc
            .post_json(
                "/api/v1/auth/register",
                &serde_json::json!({ "username": username, "password": password }),
            )
            .await
    }

    /// `Login(name, password) → (pair, user)`
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.rpc
            .post_json(
                "/api/v1/auth/login",
                &serde_json::json!({ "username": username, "password": password }),
            )
            .await
    }

    /// `RefreshToken(refresh) → (access, refresh, expires_at)`
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        self.rpc
            .post_json(
                "/api/v1/auth/refresh",
                &serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await
    }

    /// `ValidateToken(access) → (user_id, name, is_admin, is_valid)`
    pub async fn validate_token(&self, access_token: &str) -> Result<ValidateResponse, ApiError> {
        self.rpc
            .post_json(
                "/api/v1/auth/validate",
                &serde_json::json!({ "access_token": access_token }),
            )
            .await
    }

    /// `Logout(access) → success` - revokes every session of the subject.
    pub async fn logout(&self, access_token: &str) -> Result<MessageResponse, ApiError> {
        self.rpc
            .post_json(
                "/api/v1/auth/logout",
                &serde_json::json!({ "access_token": access_token }),
            )
            .await
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
    async fn test_login_parses_pair_and_user() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .and(body_json(serde_json::json!({
                "username": "alice",
                "password": "secret123"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "acc",
                "refresh_token": "ref",
                "expires_at": 1_750_000_000,
                "user": {
                    "id": 1,
                    "username": "alice",
                    "is_admin": false,
                    "created_at": "2026-01-15T10:30:00Z"
                }
            })))
            .mount(&server)
            .await;

        let response = client(&server).login("alice", "secret123").await.unwrap();

        assert_eq!(response.access_token, "acc");
        assert_eq!(response.user.username, "alice");
    }

    #[tokio::test]
    async fn test_error_kind_survives_the_hop() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "TOKEN_INVALID",
                "message": "Invalid token",
                "timestamp": "2026-01-15T10:30:00Z"
            })))
            .mount(&server)
            .await;

        let result = client(&server).refresh("revoked").await;
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let client = AuthClient::new("http://127.0.0.1:1", Duration::from_millis(200));

        let result = client.validate_token("any").await;
        assert!(matches!(result, Err(ApiError::Upstream { .. })));
    }
}

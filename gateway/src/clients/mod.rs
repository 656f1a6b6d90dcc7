//! # Internal RPC Clients
//!
//! HTTP clients for the auth and forum services. Both wrap the same
//! [`RpcClient`] plumbing: JSON in, JSON out, per-request deadline, and
//! error-kind preservation across the hop via the stable `code` field of
//! the shared error envelope.

mod auth;
mod forum;

pub use auth::AuthClient;
pub use forum::ForumClient;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::errors::{ApiError, ErrorResponse};
use std::time::Duration;
use tracing::warn;

/// Shared request plumbing for the service clients.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
    /// Upstream name used in error reporting
    service: &'static str,
}

impl RpcClient {
    /// Creates a client with a per-request deadline.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized (startup-only path).
    pub fn new(service: &'static str, base_url: &str, request_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service,
        }
    }

    /// POST a JSON body, parse a JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.url(path)).json(body);
        self.execute(request).await
    }

    /// GET a JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.http.get(self.url(path))).await
    }

    /// DELETE, expecting an empty success body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(path))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(self.rebuild_error(response).await)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| self.unreachable(e))?;

        if response.status().is_success() {
            return response.json().await.map_err(|e| ApiError::Internal {
                message: format!("Malformed {} response: {}", self.service, e),
            });
        }

        Err(self.rebuild_error(response).await)
    }

    fn unreachable(&self, e: reqwest::Error) -> ApiError {
        warn!(service = self.service, error = %e, "Upstream unreachable");
        ApiError::Upstream { service: self.service.to_string() }
    }

    /// Rebuilds the upstream error kind from the stable wire code so the
    /// taxonomy maps one-to-one through the gateway.
    async fn rebuild_error(&self, response: reqwest::Response) -> ApiError {
        match response.json::<ErrorResponse>().await {
            Ok(body) => ApiError::from_code(&body.code, body.message),
            Err(_) => ApiError::Upstream { service: self.service.to_string() },
        }
    }
}

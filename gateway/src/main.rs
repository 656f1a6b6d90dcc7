//! # Forum Backend - API Gateway
//!
//! The **gateway** is the single external HTTP surface of the forum. It
//! authenticates requests against the auth service, translates each
//! endpoint into one downstream RPC, and enforces that server-assigned
//! identity fields come from the validated token, never from client input.
//!
//! ## Request Flow
//!
//! ```text
//!                    ┌──────────────────────────────────────────┐
//!                    │                 gateway                  │
//! ┌────────┐  HTTP   │  ┌──────┐  ┌────────────┐  ┌──────────┐  │  HTTP  ┌──────────────┐
//! │ Client │────────►│  │ CORS │─►│ /api auth  │─►│ handlers │──┼───────►│ auth-service │
//! └────────┘         │  └──────┘  │ middleware │  └────┬─────┘  │        └──────────────┘
//!                    │            └────────────┘       │        │  HTTP  ┌───────────────┐
//!                    │                                 └────────┼───────►│ forum-service │
//!                    └──────────────────────────────────────────┘        └───────────────┘
//! ```
//!
//! WebSocket chat is the one exception: `GET /ws/chat` answers with a
//! redirect to the forum service's own WebSocket endpoint.
//!
//! ## Configuration
//!
//! - `SERVICE_NAME=gateway`
//! - `AUTH_SERVICE_URL` (default: `http://localhost:8001`)
//! - `FORUM_SERVICE_URL` (default: `http://localhost:8002`)
//! - `APP_UPSTREAM__FORUM_WS_URL` (default: `ws://localhost:8002/ws/chat`)
//! - `APP_UPSTREAM__REQUEST_TIMEOUT_SECONDS` - per-RPC deadline (default: 10)

use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use shared::{config::AppConfig, tracing_config};
use std::time::Duration;
use tracing::info;

mod clients;
mod dto;
mod handlers;
mod middleware;
mod routes;

use clients::{AuthClient, ForumClient};

/// Shared application state injected into all request handlers.
pub struct AppState {
    /// Auth service RPC client
    pub auth: AuthClient,
    /// Forum service RPC client
    pub forum: ForumClient,
    /// Target of the `/ws/chat` redirect
    pub forum_ws_url: String,
}

/// Application entry point and server initialization.
///
/// # Initialization Sequence
///
/// 1. Load configuration from environment variables
/// 2. Initialize structured logging/tracing
/// 3. Build the RPC clients for both internal services
/// 4. Configure and run the HTTP server
///
/// The gateway holds no database and no background tasks; graceful
/// shutdown is entirely Actix-web draining in-flight requests.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // ─────────────────────────────────────────────────────────────────────
    // Step 1: Load configuration from environment
    // ─────────────────────────────────────────────────────────────────────
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // ─────────────────────────────────────────────────────────────────────
    // Step 2: Initialize structured logging
    // ─────────────────────────────────────────────────────────────────────
    tracing_config::init_tracing("gateway", config.is_production());

    info!(
        host = %config.server.host,
        port = config.server.port,
        auth_url = %config.upstream.auth_url,
        forum_url = %config.upstream.forum_url,
        "Starting gateway"
    );

    // ─────────────────────────────────────────────────────────────────────
    // Step 3: Build the internal RPC clients
    // ─────────────────────────────────────────────────────────────────────
    // Every downstream call carries this deadline; handlers give up and
    // answer 503 rather than hang on a dead upstream.
    let request_timeout = Duration::from_secs(config.upstream.request_timeout_seconds);

    let app_state = web::Data::new(AppState {
        auth: AuthClient::new(&config.upstream.auth_url, request_timeout),
        forum: ForumClient::new(&config.upstream.forum_url, request_timeout),
        forum_ws_url: config.upstream.forum_ws_url.clone(),
    });

    // ─────────────────────────────────────────────────────────────────────
    // Step 4: Configure and run the HTTP server
    // ─────────────────────────────────────────────────────────────────────
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    info!("Server listening on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            .wrap(routes::cors())
            .wrap(actix_middleware::Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((server_host, server_port))?
    .run()
    .await
}

//! # Forum Backend - Forum Service
//!
//! The **forum-service** owns posts, comments and the live chat. It exposes
//! an HTTP RPC surface for the gateway plus the WebSocket chat endpoint,
//! and it authenticates chat connections against the auth service.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  HTTP Layer (api/)                WebSocket Layer (ws/)           │
//! │  routes / handlers / DTOs         ChatHub + session loops         │
//! └──────────┬────────────────────────────────┬──────────────────────-┘
//!            ▼                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Service Layer (service/)                                         │
//! │  ForumService (posts, comments)   ChatService (validate/persist)  │
//! └──────────┬────────────────────────────────┬───────────────────────┘
//!            ▼                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Repository Layer (repository/)                                   │
//! │  PostRepository / CommentRepository / MessageStore                │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Token validation for the chat goes through `clients::AuthClient`
//! (HTTP call to the auth service), behind the `TokenValidator` trait.
//!
//! ## Background Work
//!
//! A [`shared::sweeper::Sweeper`] deletes chat messages older than
//! `chat.message_lifetime_seconds` every `chat.cleanup_interval_seconds`.
//!
//! ## Configuration
//!
//! - `SERVICE_NAME=forum-service`
//! - `DATABASE_URL` - posts/comments/chat database
//! - `AUTH_SERVICE_URL` - token validation endpoint
//! - `APP_CHAT__MAX_MESSAGE_LENGTH` (default: 1000)
//! - `APP_CHAT__MESSAGE_LIFETIME_SECONDS` (default: 86400)
//! - `APP_CHAT__CLEANUP_INTERVAL_SECONDS` (default: 300)

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use shared::{config::AppConfig, database, sweeper::Sweeper, tracing_config};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod clients;
mod domain;
mod repository;
mod service;
mod ws;

use api::routes;
use clients::{AuthClient, TokenValidator};
use repository::{CommentRepository, PgMessageStore, PostRepository};
use service::{ChatService, ForumService};
use ws::ChatHub;

/// Shared application state injected into all request handlers.
pub struct AppState {
    /// Post and comment business logic
    pub forum_service: ForumService,
    /// Chat validation, persistence and retention
    pub chat_service: ChatService,
    /// Live WebSocket session registry
    pub hub: Arc<ChatHub>,
    /// Access-token validation against the auth service
    pub validator: Arc<dyn TokenValidator>,
}

/// Application entry point and server initialization.
///
/// # Initialization Sequence
///
/// 1. Load configuration from environment variables
/// 2. Initialize structured logging/tracing
/// 3. Create PostgreSQL connection pool and run migrations
/// 4. Instantiate repositories, services, hub and auth client
/// 5. Start the chat retention sweeper
/// 6. Configure and run the HTTP server
///
/// # Graceful Shutdown
///
/// Actix-web drains in-flight requests on SIGTERM/SIGINT; the retention
/// sweeper is joined afterwards, letting an in-flight deletion finish.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // ─────────────────────────────────────────────────────────────────────
    // Step 1: Load configuration from environment
    // ─────────────────────────────────────────────────────────────────────
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // ─────────────────────────────────────────────────────────────────────
    // Step 2: Initialize structured logging
    // ─────────────────────────────────────────────────────────────────────
    tracing_config::init_tracing("forum-service", config.is_production());

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting forum-service"
    );

    // ─────────────────────────────────────────────────────────────────────
    // Step 3: Create connection pool and run migrations
    // ─────────────────────────────────────────────────────────────────────
    let db_pool = database::create_pool(&config.database)
        .await
        .expect("Failed to create database pool");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // ─────────────────────────────────────────────────────────────────────
    // Step 4: Instantiate services with dependencies
    // ─────────────────────────────────────────────────────────────────────
    let forum_service = ForumService::new(
        PostRepository::new(db_pool.clone()),
        CommentRepository::new(db_pool.clone()),
    );

    let chat_service = ChatService::new(
        Arc::new(PgMessageStore::new(db_pool.clone())),
        config.chat.max_message_length,
        config.chat.message_lifetime_seconds,
    );

    let hub = Arc::new(ChatHub::new());

    let validator: Arc<dyn TokenValidator> = Arc::new(AuthClient::new(
        &config.upstream.auth_url,
        Duration::from_secs(config.upstream.request_timeout_seconds),
    ));

    let app_state = web::Data::new(AppState {
        forum_service,
        chat_service: chat_service.clone(),
        hub,
        validator,
    });

    // ─────────────────────────────────────────────────────────────────────
    // Step 5: Start the chat retention sweeper
    // ─────────────────────────────────────────────────────────────────────
    // Deletions are not broadcast; readers simply stop seeing old rows.
    let sweep_service = chat_service.clone();
    let sweeper = Sweeper::spawn(
        "chat-retention",
        Duration::from_secs(config.chat.cleanup_interval_seconds),
        move || {
            let service = sweep_service.clone();
            async move { service.sweep_expired().await.map(|_| ()) }
        },
    );

    // ─────────────────────────────────────────────────────────────────────
    // Step 6: Configure and run the HTTP server
    // ─────────────────────────────────────────────────────────────────────
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    info!("Server listening on {}:{}", server_host, server_port);

    let result = HttpServer::new(move || {
        // WebSocket clients connect here directly (the gateway redirects),
        // so the handshake must pass CORS in development.
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((server_host, server_port))?
    .run()
    .await;

    // The server has drained; stop background work before exiting.
    sweeper.shutdown().await;

    result
}

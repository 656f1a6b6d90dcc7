//! # Forum Backend - Authentication Service
//!
//! The **auth-service** owns the credential lifecycle for the forum:
//! registration, login, token rotation, validation, logout and the periodic
//! eviction of expired refresh credentials.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HTTP Layer (api/)                        │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │   routes    │  │  handlers   │  │    DTOs (Request/Res)   │  │
//! │  └──────┬──────┘  └──────┬──────┘  └────────────┬────────────┘  │
//! └─────────┼────────────────┼─────────────────────┼────────────────┘
//!           ▼                ▼                     ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Service Layer (service/)                     │
//! │  AuthService: register, login, refresh, validate, logout        │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                Repository Layer (repository/)                   │
//! │  UserStore / RefreshStore traits + PostgreSQL implementations   │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (domain/)                       │
//! │  User, UserProfile, RefreshTokenRecord                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## API Endpoints
//!
//! | Method | Endpoint                          | Description             |
//! |--------|-----------------------------------|-------------------------|
//! | POST   | `/api/v1/auth/register`           | Create account + pair   |
//! | POST   | `/api/v1/auth/login`              | Authenticate user       |
//! | POST   | `/api/v1/auth/refresh`            | Rotate token pair       |
//! | POST   | `/api/v1/auth/validate`           | Validate access token   |
//! | POST   | `/api/v1/auth/logout`             | Revoke all sessions     |
//! | GET    | `/api/v1/auth/admin-status/{id}`  | Read admin flag         |
//! | PUT    | `/api/v1/auth/users/{id}`         | Rename                  |
//! | DELETE | `/api/v1/auth/users/{id}`         | Delete account          |
//! | GET    | `/health`                         | Service health          |
//!
//! ## Background Work
//!
//! A [`shared::sweeper::Sweeper`] deletes expired refresh records on a fixed
//! interval (`auth.sweep_interval_seconds`). Graceful shutdown stops the
//! HTTP server first, then joins the sweeper.
//!
//! ## Configuration
//!
//! Environment variables are loaded via [`shared::config::AppConfig`]. Key
//! settings for this service:
//!
//! - `SERVICE_NAME=auth-service`
//! - `DATABASE_URL` - users/refresh_tokens database
//! - `JWT_SECRET` - token signing key
//! - `APP_AUTH__ACCESS_TOKEN_TTL_SECONDS` (default: 900)
//! - `APP_AUTH__REFRESH_TOKEN_TTL_SECONDS` (default: 2592000)

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use shared::{
    auth::{JwtService, PasswordHasher},
    config::AppConfig,
    database,
    sweeper::Sweeper,
    tracing_config,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod domain;
mod repository;
mod service;

use api::routes;
use repository::{PgRefreshStore, PgUserStore};
use service::AuthService;

/// Shared application state injected into all request handlers.
pub struct AppState {
    /// Authentication service with business logic for credential operations
    pub auth_service: AuthService,
}

/// Application entry point and server initialization.
///
/// # Initialization Sequence
///
/// 1. Load configuration from environment variables
/// 2. Initialize structured logging/tracing
/// 3. Create PostgreSQL connection pool and run migrations
/// 4. Instantiate stores and services
/// 5. Start the expired-credential sweeper
/// 6. Configure and run the HTTP server
///
/// # Graceful Shutdown
///
/// Actix-web handles SIGTERM/SIGINT: it stops accepting new connections and
/// drains in-flight requests. The sweeper is joined afterwards, letting an
/// in-flight sweep finish.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // ─────────────────────────────────────────────────────────────────────
    // Step 1: Load configuration from environment
    // ─────────────────────────────────────────────────────────────────────
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // ─────────────────────────────────────────────────────────────────────
    // Step 2: Initialize structured logging
    // ─────────────────────────────────────────────────────────────────────
    tracing_config::init_tracing("auth-service", config.is_production());

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting auth-service"
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
    // The signing key is loaded once here and shared by reference.
    let jwt_service = Arc::new(JwtService::new(&config.auth));
    let password_hasher = Arc::new(PasswordHasher::new());
    let auth_service = AuthService::new(
        Arc::new(PgUserStore::new(db_pool.clone())),
        Arc::new(PgRefreshStore::new(db_pool.clone())),
        jwt_service,
        password_hasher,
    );

    let app_state = web::Data::new(AppState {
        auth_service: auth_service.clone(),
    });

    // ─────────────────────────────────────────────────────────────────────
    // Step 5: Start the expired-credential sweeper
    // ─────────────────────────────────────────────────────────────────────
    let sweep_service = auth_service.clone();
    let sweeper = Sweeper::spawn(
        "refresh-eviction",
        Duration::from_secs(config.auth.sweep_interval_seconds),
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
        // This service only talks to the gateway and the forum service;
        // permissive CORS here is for development tooling hitting it directly.
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            // Middleware stack (first added = last executed)
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

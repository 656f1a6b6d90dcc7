//! # Forum Backend - Shared Library
//!
//! Core shared functionality for the forum backend services.
//!
//! This crate provides common utilities, types, and services that are used
//! across the auth service, the forum service and the gateway. It follows the
//! DRY principle to avoid code duplication and ensure consistency.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Services                              │
//! │  ┌─────────┐    ┌─────────┐    ┌─────────┐                  │
//! │  │  Auth   │    │  Forum  │    │ Gateway │                  │
//! │  └────┬────┘    └────┬────┘    └────┬────┘                  │
//! │       │              │              │                       │
//! │       └──────────────┴──────────────┘                       │
//! │                      │                                      │
//! │             ┌────────▼────────┐                             │
//! │             │  shared crate   │ ◄── You are here            │
//! │             └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose | Key Types |
//! |--------|---------|-----------|
//! | [`config`] | Environment-based configuration | [`AppConfig`] |
//! | [`errors`] | Standardized error handling | [`ApiError`], [`ApiResult`] |
//! | [`auth`] | Signed bearer tokens, password hashing | [`auth::jwt::JwtService`], [`auth::password::PasswordHasher`] |
//! | [`database`] | PostgreSQL connection pool | [`create_pool`](database::create_pool) |
//! | [`sweeper`] | Periodic background task harness | [`sweeper::Sweeper`] |
//! | [`tracing_config`] | Structured logging setup | [`init_tracing`](tracing_config::init_tracing) |
//! | [`validation`] | Request validation helpers | Custom validators |
//!
//! ## Design Decisions
//!
//! 1. **Single source of truth**: All shared types live here to prevent drift
//! 2. **Security first**: Auth and crypto follow OWASP guidelines
//! 3. **Observable by default**: Structured logging and tracing built-in
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::{AppConfig, ApiError, ApiResult};
//! use shared::auth::{jwt::JwtService, password::PasswordHasher};
//! use shared::database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let db_pool = database::create_pool(&config.database).await?;
//!     let jwt = JwtService::new(&config.auth);
//!
//!     // Ready to build your service!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod sweeper;
pub mod tracing_config;
pub mod validation;

// Re-exports for convenience - import commonly used types directly from `shared`
pub use config::AppConfig;
pub use errors::{ApiError, ApiResult};

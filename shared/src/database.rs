//! # PostgreSQL Connection Pool
//!
//! Database connection management using sqlx's async connection pool.
//!
//! Each service owns one pool over its own database: the auth service over
//! the users/refresh-tokens schema, the forum service over posts, comments
//! and chat messages. A pool maintains a set of reusable connections;
//! handlers borrow one per query and return it when done.
//!
//! ## Pool Configuration
//!
//! | Parameter | Default | Description |
//! |-----------|---------|-------------|
//! | `max_connections` | 10 | Maximum connections in pool |
//! | `min_connections` | 1 | Minimum connections to maintain |
//! | `connect_timeout` | 30s | Timeout for acquiring connection |
//! | `max_lifetime` | 30min | Recycle connections after this time |
//!
//! **Sizing rule of thumb**: `max_connections = (2 × cpu_cores) + disk_spindles`.
//! Don't set too high - idle connections consume memory on both sides.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::database::create_pool;
//! use shared::config::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! let pool = create_pool(&config.database).await?;
//!
//! let users: Vec<User> = sqlx::query_as("SELECT * FROM users")
//!     .fetch_all(&pool)
//!     .await?;
//! ```

use crate::config::DatabaseConfig;
use crate::errors::ApiError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

// =============================================================================
// Pool Creation
// =============================================================================

/// Creates a PostgreSQL connection pool.
///
/// This function establishes the initial connections and validates
/// connectivity. It should be called once at application startup.
///
/// ## Returns
///
/// A `PgPool` that can be cloned and shared across handlers.
/// `PgPool` is an `Arc` internally, so cloning is cheap.
///
/// ## Errors
///
/// Returns `ApiError::DatabaseError` if:
/// - Connection URL is invalid
/// - Database is unreachable
/// - Authentication fails
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, ApiError> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_seconds = config.connect_timeout_seconds,
        max_lifetime_seconds = config.max_lifetime_seconds,
        "Creating database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        // How long to wait for a connection before timing out
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        // Recycle connections after this time (prevents stale connections)
        .max_lifetime(Duration::from_secs(config.max_lifetime_seconds))
        // Verify connection is valid before handing it out
        .test_before_acquire(true)
        .connect(&config.url)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create database pool");
            ApiError::DatabaseError(e)
        })?;

    info!("Database connection pool created successfully");

    Ok(pool)
}

// =============================================================================
// Health Check
// =============================================================================

/// Verifies database connectivity.
///
/// Executes a simple `SELECT 1` query; used by health check endpoints.
///
/// ## Errors
///
/// Returns `ApiError::DatabaseError` if the query fails.
pub async fn health_check(pool: &PgPool) -> Result<(), ApiError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

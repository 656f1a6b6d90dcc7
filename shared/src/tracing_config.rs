//! # Tracing and Structured Logging Configuration
//!
//! Initializes the logging system with environment-appropriate settings.
//!
//! ## Output Formats
//!
//! | Environment | Format | Purpose |
//! |-------------|--------|---------|
//! | Development | Pretty | Human-readable, colored output |
//! | Production | JSON | Machine-parseable for log aggregation |
//!
//! ## Filter Configuration
//!
//! Control verbosity via the `RUST_LOG` environment variable:
//!
//! ```bash
//! # All debug
//! RUST_LOG=debug
//!
//! # Info for most, debug for our code
//! RUST_LOG=info,auth_service=debug
//!
//! # Silence noisy crates
//! RUST_LOG=info,hyper=warn,sqlx=warn
//! ```
//!
//! ## Best Practices
//!
//! 1. **Use structured fields**: `info!(user_id = %id, "Action")` not `info!("User {} did action", id)`
//! 2. **Don't log sensitive data**: passwords, tokens, hashes
//! 3. **Use appropriate levels**: INFO for business events, DEBUG for troubleshooting

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

// =============================================================================
// Initialization
// =============================================================================

/// Initializes the tracing/logging system.
///
/// This should be called **once** at the very start of the application,
/// before any other code that might emit logs.
///
/// ## Parameters
///
/// - `service_name`: Name of the service (for identification in logs)
/// - `is_production`: If true, outputs JSON; if false, outputs pretty format
///
/// ## Defaults
///
/// If `RUST_LOG` is not set:
/// - Production: `info`
/// - Development: `debug,hyper=info,sqlx=warn`
pub fn init_tracing(service_name: &str, is_production: bool) {
    // Build filter from RUST_LOG env var, or use defaults
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info")
        } else {
            // Development: debug level, but silence noisy crates
            EnvFilter::new("debug,hyper=info,sqlx=warn")
        }
    });

    if is_production {
        // Production: JSON structured output for log aggregation tools
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .init();
    } else {
        // Development: pretty, human-readable output
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    }

    // Log that tracing is initialized (useful for verifying setup)
    tracing::info!(
        service = service_name,
        production = is_production,
        "Tracing initialized"
    );
}

//! # Periodic Sweeper
//!
//! A small harness for background retention tasks: run an async closure on a
//! fixed interval until told to stop.
//!
//! Two jobs in the system use it:
//!
//! | Service | Task | Interval |
//! |---------|------|----------|
//! | auth-service | delete expired refresh tokens | `auth.sweep_interval_seconds` |
//! | forum-service | delete chat messages past retention | `chat.cleanup_interval_seconds` |
//!
//! ## Lifecycle
//!
//! ```text
//! Sweeper::spawn ──► tick ──► task() ──► tick ──► task() ──► ...
//!                                 │
//!                    stop()/shutdown() ──► loop exits, task joined
//! ```
//!
//! Task errors are logged and the loop continues - a failed sweep is retried
//! on the next tick. The stop signal is a `watch` channel write: it never
//! blocks, and calling [`Sweeper::stop`] more than once is harmless. A run
//! already in flight when the signal arrives finishes before the loop exits.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let store = message_store.clone();
//! let sweeper = Sweeper::spawn("chat-retention", Duration::from_secs(300), move || {
//!     let store = store.clone();
//!     async move {
//!         let cutoff = Utc::now() - chrono::Duration::seconds(86_400);
//!         store.delete_older_than(cutoff).await.map(|_| ())
//!     }
//! });
//!
//! // ... on shutdown:
//! sweeper.shutdown().await;
//! ```

use crate::errors::ApiError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

// =============================================================================
// Sweeper
// =============================================================================

/// Handle to a running periodic background task.
///
/// Dropping the handle does **not** stop the task; call [`Sweeper::stop`] or
/// [`Sweeper::shutdown`] during graceful shutdown.
pub struct Sweeper {
    /// Name used in log lines
    name: &'static str,
    /// Close-style stop signal; writing `true` ends the loop
    stop_tx: watch::Sender<bool>,
    /// Join handle of the spawned loop
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawns a sweep loop running `task` once per `every`.
    ///
    /// The first run happens one full interval after spawn (not
    /// immediately), matching a plain ticker. Missed ticks are skipped
    /// rather than bursted.
    ///
    /// ## Parameters
    ///
    /// - `name`: identifies the sweeper in logs
    /// - `every`: tick interval
    /// - `task`: async closure executed on each tick; errors are logged and
    ///   the loop continues
    pub fn spawn<F, Fut>(name: &'static str, every: Duration, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ApiError>> + Send,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // An interval's first tick completes immediately; consume it so
            // the first sweep runs after one full period.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = task().await {
                            error!(sweeper = name, error = %e, "Sweep failed");
                        }
                    }
                    changed = stop_rx.changed() => {
                        // Either the stop flag was set or the sender is gone;
                        // both end the loop.
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!(sweeper = name, "Sweeper stopped");
        });

        debug!(sweeper = name, interval_seconds = every.as_secs(), "Sweeper started");

        Self {
            name,
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signals the loop to stop.
    ///
    /// Safe to call any number of times, from any task. A sweep already in
    /// progress finishes; no further ticks run afterwards.
    pub fn stop(&self) {
        // The receiver only disappears once the loop has already exited, so
        // a send error here just means there is nothing left to stop.
        let _ = self.stop_tx.send(true);
    }

    /// Stops the loop and waits for it to finish.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(sweeper = self.name, error = %e, "Sweeper task panicked");
            }
        }
    }
}

impl std::fmt::Debug for Sweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper").field("name", &self.name).finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

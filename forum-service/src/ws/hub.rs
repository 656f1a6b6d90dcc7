//! # Chat Hub
//!
//! The registry of live WebSocket sessions and the fan-out path.
//!
//! ## Concurrency Model
//!
//! Each session owns an unbounded outbound queue with a **single writer**
//! (the broadcast) and a **single reader** (the session's write loop). The
//! registry itself is a `std::sync::RwLock`: enqueueing is a non-blocking
//! channel send, so the lock is only ever held for map access, never across
//! I/O. Broadcast iterates under the read lock and collects dead sessions,
//! then removes them under the write lock - concurrent registration and
//! removal never stall the fan-out.
//!
//! A session whose queue is closed (its write loop hit a write error and
//! dropped the receiver) is evicted during broadcast instead of blocking
//! anyone: slow or dead consumers lose their session, not the room.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Identifier of one live connection.
pub type ConnId = u64;

/// One live session's registry entry.
struct SessionHandle {
    /// Authenticated subject
    user_id: i64,
    /// Authenticated display name
    username: String,
    /// Outbound queue feeding the session's write loop
    tx: UnboundedSender<String>,
}

/// Registry of live chat sessions.
///
/// Shared as `Arc<ChatHub>` between the WebSocket handlers and anything
/// that needs to fan a frame out.
#[derive(Default)]
pub struct ChatHub {
    /// Live sessions keyed by connection id
    sessions: RwLock<HashMap<ConnId, SessionHandle>>,
    /// Connection id source
    next_id: AtomicU64,
}

impl ChatHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an authenticated session and returns its connection id.
    pub fn register(&self, user_id: i64, username: &str, tx: UnboundedSender<String>) -> ConnId {
        let conn_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;

        self.sessions.write().unwrap().insert(
            conn_id,
            SessionHandle {
                user_id,
                username: username.to_string(),
                tx,
            },
        );

        info!(conn_id = conn_id, user_id = user_id, username = %username, "Chat session joined");

        conn_id
    }

    /// Removes a session. Idempotent: removing an already-removed session
    /// is a no-op.
    pub fn unregister(&self, conn_id: ConnId) {
        if let Some(handle) = self.sessions.write().unwrap().remove(&conn_id) {
            info!(conn_id = conn_id, user_id = handle.user_id, "Chat session left");
        }
    }

    /// Enqueues a frame to every live session, the sender included.
    ///
    /// Sessions whose queue is closed are removed from the registry.
    pub fn broadcast(&self, frame: &str) {
        let mut dead = Vec::new();

        {
            let sessions = self.sessions.read().unwrap();
            for (conn_id, handle) in sessions.iter() {
                if handle.tx.send(frame.to_string()).is_err() {
                    dead.push(*conn_id);
                }
            }
        }

        if !dead.is_empty() {
            let mut sessions = self.sessions.write().unwrap();
            for conn_id in dead {
                if let Some(handle) = sessions.remove(&conn_id) {
                    debug!(
                        conn_id = conn_id,
                        user_id = handle.user_id,
                        username = %handle.username,
                        "Evicted dead chat session during broadcast"
                    );
                }
            }
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

// =============================================================================
// Tests
// =============================================================================

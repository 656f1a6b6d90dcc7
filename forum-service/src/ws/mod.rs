//! # Live Chat over WebSocket
//!
//! The chat endpoint speaks UTF-8 JSON text frames.
//!
//! ## Protocol
//!
//! The first inbound frame must be an authentication envelope; everything
//! else before authentication closes the connection:
//!
//! ```json
//! { "type": "auth", "token": "<access-credential>" }
//! ```
//!
//! After authentication:
//!
//! | Inbound | Server reaction |
//! |---------|-----------------|
//! | `{"type":"message","content":"…"}` | validate, persist, fan out to every live session |
//! | `{"type":"history"}` | `{"type":"history","messages":[…]}` to the requester only |
//! | anything else | ignored (forward compatibility) |
//!
//! Server-originated frames are the persisted message object, the history
//! reply, or `{"error":"…"}`.
//!
//! ## Session State Machine
//!
//! ```text
//! DIAL → AWAIT_AUTH → (auth_ok → CONNECTED) | (auth_fail → CLOSED)
//! CONNECTED → (read_err | write_err | peer_close → CLOSED)
//! ```

mod hub;
mod session;

pub use hub::{ChatHub, ConnId};
pub use session::chat_ws;

use serde::Deserialize;

use crate::domain::ChatMessage;

// =============================================================================
// Frames
// =============================================================================

/// Client-originated frame.
///
/// Unknown `type` tags deserialize to [`ClientFrame::Unknown`] and are
/// ignored, so old servers tolerate newer clients.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Authentication envelope; must be the first frame
    Auth { token: String },
    /// A chat line to persist and fan out
    Message { content: String },
    /// Request for the full message log
    History,
    /// Any unrecognized frame type
    #[serde(other)]
    Unknown,
}

/// Serializes the error frame `{"error":"…"}`.
pub(crate) fn error_frame(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Serializes the history reply frame.
pub(crate) fn history_frame(messages: &[ChatMessage]) -> String {
    serde_json::json!({ "type": "history", "messages": messages }).to_string()
}

// =============================================================================
// Tests
// =============================================================================

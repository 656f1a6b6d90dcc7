//! # WebSocket Session Loop
//!
//! Per-connection protocol handling: first-frame authentication, the read
//! loop, and the write loop draining the session's outbound queue.
//!
//! ```text
//!            ┌────────────────────────────────────────────────┐
//!            │                 run_session                    │
//!            │                                                │
//!  client ──►│ read loop ──► process_frame ──► hub.broadcast ─┼──► every
//!            │                                   │            │    session's
//!            │ write loop ◄── outbound queue ◄───┘            │    queue
//!            └────────────────────────────────────────────────┘
//! ```
//!
//! The read loop exits on any read error, protocol close, or malformed
//! stream end; the session is then unregistered (idempotently) and closed.

use actix_ws::{Message, MessageStream, Session};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clients::{AccessIdentity, TokenValidator};
use crate::service::ChatService;

use super::{error_frame, history_frame, ChatHub, ClientFrame};

/// WebSocket entry point.
///
/// # Route
///
/// `GET /ws/chat`
///
/// Upgrades the connection and spawns the session loop; authentication
/// happens on the first frame inside the loop.
pub async fn chat_ws(
    req: actix_web::HttpRequest,
    stream: actix_web::web::Payload,
    state: actix_web::web::Data<crate::AppState>,
) -> actix_web::Result<actix_web::HttpResponse> {
    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    actix_web::rt::spawn(run_session(
        session,
        msg_stream,
        state.hub.clone(),
        state.chat_service.clone(),
        state.validator.clone(),
    ));

    Ok(response)
}

/// Drives one connection from upgrade to close.
async fn run_session(
    mut session: Session,
    mut stream: MessageStream,
    hub: Arc<ChatHub>,
    chat: ChatService,
    validator: Arc<dyn TokenValidator>,
) {
    // ── AWAIT_AUTH ───────────────────────────────────────────────────────
    let identity = match authenticate(&mut session, &mut stream, validator.as_ref()).await {
        Some(identity) => identity,
        None => {
            // Error frame already sent where appropriate; nothing was
            // registered.
            let _ = session.close(None).await;
            return;
        }
    };

    // ── CONNECTED ────────────────────────────────────────────────────────
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let conn_id = hub.register(identity.user_id, &identity.username, tx);

    // Write loop: the queue's single reader. A write error ends the
    // session; eviction from the hub is idempotent with the cleanup below.
    let mut write_session = session.clone();
    let write_hub = hub.clone();
    let writer = actix_web::rt::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if write_session.text(frame).await.is_err() {
                write_hub.unregister(conn_id);
                break;
            }
        }
    });

    // Read loop: inbound frames are processed in arrival order.
    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                // Malformed JSON is skipped, like any unknown frame type
                let Ok(frame) = serde_json::from_str::<ClientFrame>(&text) else {
                    debug!(user_id = identity.user_id, "Skipping malformed chat frame");
                    continue;
                };

                if let Some(reply) = process_frame(frame, &identity, &hub, &chat).await {
                    if session.text(reply).await.is_err() {
                        break;
                    }
                }
            }
            Message::Ping(bytes) => {
                if session.pong(&bytes).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // ── CLOSED ───────────────────────────────────────────────────────────
    info!(user_id = identity.user_id, username = %identity.username, "Chat session closing");
    hub.unregister(conn_id);
    writer.abort();
    let _ = session.close(None).await;
}

/// Waits for the authentication envelope and validates it.
///
/// Returns `None` (after sending `{"error":"unauthorized"}` where the peer
/// is still reachable) when the first frame is not a valid, successfully
/// validated auth envelope. No session is registered in that case.
async fn authenticate(
    session: &mut Session,
    stream: &mut MessageStream,
    validator: &dyn TokenValidator,
) -> Option<AccessIdentity> {
    // Protocol-level frames may precede the first text frame
    let first = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => break text,
            Some(Ok(Message::Ping(bytes))) => {
                session.pong(&bytes).await.ok()?;
            }
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return None,
            Some(Ok(_)) => return reject(session).await,
        }
    };

    let Some(token) = auth_token(&first) else {
        warn!("WebSocket connection sent a non-auth first frame");
        return reject(session).await;
    };

    match validator.validate(&token).await {
        Ok(identity) => {
            info!(user_id = identity.user_id, username = %identity.username, "Chat authentication successful");
            Some(identity)
        }
        Err(e) => {
            warn!(error = %e, "WebSocket token validation failed");
            reject(session).await
        }
    }
}

/// Extracts the token from a first frame iff it is a well-formed auth
/// envelope with a non-empty token.
fn auth_token(frame: &str) -> Option<String> {
    match serde_json::from_str::<ClientFrame>(frame) {
        Ok(ClientFrame::Auth { token }) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Sends the unauthorized error frame; the caller closes the connection.
async fn reject(session: &mut Session) -> Option<AccessIdentity> {
    let _ = session.text(error_frame("unauthorized")).await;
    None
}

/// Handles one post-auth frame.
///
/// Returns a frame to send back to the requester only (history reply or an
/// error); broadcasts go through the hub to every session, the sender
/// included.
async fn process_frame(
    frame: ClientFrame,
    identity: &AccessIdentity,
    hub: &ChatHub,
    chat: &ChatService,
) -> Option<String> {
    match frame {
        ClientFrame::Message { content } => {
            match chat.send(identity.user_id, &identity.username, &content).await {
                Ok(message) => match serde_json::to_string(&message) {
                    Ok(json) => {
                        hub.broadcast(&json);
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to serialize chat message");
                        None
                    }
                },
                // Validation failures go to the sender only
                Err(e) => Some(error_frame(&e.to_string())),
            }
        }
        ClientFrame::History => match chat.history().await {
            Ok(messages) => Some(history_frame(&messages)),
            Err(e) => Some(error_frame(&e.to_string())),
        },
        // A repeated auth envelope and unknown types are ignored
        ClientFrame::Auth { .. } | ClientFrame::Unknown => None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, NewChatMessage};
    use crate::repository::{MessageStore, MockMessageStore};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn identity() -> AccessIdentity {
        AccessIdentity { user_id: 1, username: "alice".to_string(), is_admin: false }
    }

    /// Store stub that counts persisted rows.
    fn counting_store(saved: Arc<AtomicUsize>) -> Arc<dyn MessageStore> {
        let mut store = MockMessageStore::new();
        store.expect_save().returning(move |m: NewChatMessage| {
            saved.fetch_add(1, Ordering::SeqCst);
            Ok(ChatMessage {
                id: 1,
                user_id: m.user_id,
                username: m.username,
                content: m.content,
                created_at: Utc::now(),
            })
        });
        store.expect_list().returning(|| {
            Ok(vec![ChatMessage {
                id: 1,
                user_id: 1,
                username: "alice".to_string(),
                content: "hello".to_string(),
                created_at: Utc::now(),
            }])
        });
        Arc::new(store)
    }

    fn chat(saved: Arc<AtomicUsize>) -> ChatService {
        ChatService::new(counting_store(saved), 1000, 86_400)
    }

    #[tokio::test]
    async fn test_message_frame_fans_out_to_all_sessions() {
        let saved = Arc::new(AtomicUsize::new(0));
        let hub = ChatHub::new();
        let chat = chat(saved.clone());

        let (tx1, mut rx1) = tokio::sync::mpsc::unbounded_channel();
        let (tx2, mut rx2) = tokio::sync::mpsc::unbounded_channel();
        hub.register(1, "alice", tx1);
        hub.register(2, "bob", tx2);

        let frame = ClientFrame::Message { content: "hi".to_string() };
        let reply = process_frame(frame, &identity(), &hub, &chat).await;

        // No direct reply: confirmation arrives through the fan-out
        assert!(reply.is_none());

        // Exactly one persisted row
        assert_eq!(saved.load(Ordering::SeqCst), 1);

        // Both sessions, sender included, got the confirmed message
        for rx in [&mut rx1, &mut rx2] {
            let json: serde_json::Value =
                serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
            assert_eq!(json["content"], "hi");
            assert_eq!(json["user_id"], 1);
            assert_eq!(json["username"], "alice");
        }
    }

    #[tokio::test]
    async fn test_invalid_message_replies_error_without_broadcast() {
        let saved = Arc::new(AtomicUsize::new(0));
        let hub = ChatHub::new();
        let chat = chat(saved.clone());

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        hub.register(1, "alice", tx);

        let frame = ClientFrame::Message { content: String::new() };
        let reply = process_frame(frame, &identity(), &hub, &chat).await.unwrap();

        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert!(json["error"].as_str().unwrap().contains("empty"));

        // Nothing persisted, nothing fanned out
        assert_eq!(saved.load(Ordering::SeqCst), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_history_goes_to_requester_only() {
        let saved = Arc::new(AtomicUsize::new(0));
        let hub = ChatHub::new();
        let chat = chat(saved);

        let (tx, mut other_rx) = tokio::sync::mpsc::unbounded_channel();
        hub.register(2, "bob", tx);

        let reply = process_frame(ClientFrame::History, &identity(), &hub, &chat)
            .await
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json["type"], "history");
        assert_eq!(json["messages"][0]["content"], "hello");

        // The other session saw nothing
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_and_repeat_auth_frames_are_ignored() {
        let saved = Arc::new(AtomicUsize::new(0));
        let hub = ChatHub::new();
        let chat = chat(saved.clone());

        let unknown = process_frame(ClientFrame::Unknown, &identity(), &hub, &chat).await;
        assert!(unknown.is_none());

        let re_auth = process_frame(
            ClientFrame::Auth { token: "again".to_string() },
            &identity(),
            &hub,
            &chat,
        )
        .await;
        assert!(re_auth.is_none());

        assert_eq!(saved.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_auth_token_accepts_only_auth_envelopes() {
        assert_eq!(
            auth_token(r#"{"type":"auth","token":"abc"}"#),
            Some("abc".to_string())
        );

        // Wrong type, missing token, empty token, or garbage all fail
        assert_eq!(auth_token(r#"{"type":"message","content":"hi"}"#), None);
        assert_eq!(auth_token(r#"{"type":"auth"}"#), None);
        assert_eq!(auth_token(r#"{"type":"auth","token":""}"#), None);
        assert_eq!(auth_token("not json"), None);
    }
}

//! # Route Configuration
//!
//! ```text
//! /
//! ├── health                            GET    → health_check
//! ├── ws/chat                           GET    → WebSocket upgrade
//! │
//! └── api/v1/
//!     ├── posts                         GET    → list_posts
//!     │                                 POST   → create_post
//!     ├── posts/{id}                    GET    → get_post
//!     │                                 PUT    → update_post
//!     │                                 DELETE → delete_post
//!     ├── comments                      GET    → list_comments
//!     │                                 POST   → create_comment
//!     ├── comments/{id}                 GET    → get_comment
//!     │                                 PUT    → update_comment
//!     │                                 DELETE → delete_comment
//!     ├── comments/post/{post_id}       GET    → comments_by_post
//!     └── chat/messages                 GET    → get_messages
//!                                       POST   → send_message
//! ```
//!
//! This is the internal RPC surface consumed by the gateway; the WebSocket
//! endpoint is the one route external clients reach directly (the gateway
//! redirects them here).

use actix_web::web;

use super::handlers;
use crate::ws;

/// Configures all routes for the forum service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(handlers::health_check))
        // Live chat; first frame must be the auth envelope
        .route("/ws/chat", web::get().to(ws::chat_ws))
        .service(
            web::scope("/api/v1")
                // Posts
                .route("/posts", web::get().to(handlers::list_posts))
                .route("/posts", web::post().to(handlers::create_post))
                .route("/posts/{id}", web::get().to(handlers::get_post))
                .route("/posts/{id}", web::put().to(handlers::update_post))
                .route("/posts/{id}", web::delete().to(handlers::delete_post))
                // Comments
                .route("/comments", web::get().to(handlers::list_comments))
                .route("/comments", web::post().to(handlers::create_comment))
                .route("/comments/post/{post_id}", web::get().to(handlers::comments_by_post))
                .route("/comments/{id}", web::get().to(handlers::get_comment))
                .route("/comments/{id}", web::put().to(handlers::update_comment))
                .route("/comments/{id}", web::delete().to(handlers::delete_comment))
                // Chat over HTTP
                .route("/chat/messages", web::get().to(handlers::get_messages))
                .route("/chat/messages", web::post().to(handlers::send_message)),
        );
}

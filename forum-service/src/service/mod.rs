//! Service layer: chat and forum business logic.

mod chat_service;
mod forum_service;

pub use chat_service::ChatService;
pub use forum_service::ForumService;

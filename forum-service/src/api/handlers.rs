//! # API Handlers
//!
//! Request handlers for the forum service's RPC surface: posts, comments
//! and the HTTP side of the chat.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use shared::{errors::ApiError, validation};

use crate::api::dto::*;
use crate::domain::{NewComment, NewPost};
use crate::AppState;

// =============================================================================
// Post Handlers
// =============================================================================

/// Create a post.
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let post = state
        .forum_service
        .create_post(NewPost {
            title: body.title,
            content: body.content,
            author_id: body.author_id,
            author_name: body.username,
        })
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Fetch a post by id.
pub async fn get_post(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let post = state.forum_service.get_post(*id).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Update a post.
pub async fn update_post(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let post = state.forum_service.update_post(*id, &body.title, &body.content).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post.
pub async fn delete_post(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    state.forum_service.delete_post(*id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// List all posts.
pub async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let posts = state.forum_service.posts().await?;

    Ok(HttpResponse::Ok().json(posts))
}

// =============================================================================
// Comment Handlers
// =============================================================================

/// Create a comment.
pub async fn create_comment(
    state: web::Data<AppState>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let comment = state
        .forum_service
        .create_comment(NewComment {
            post_id: body.post_id,
            author_id: body.author_id,
            author_name: body.username,
            content: body.content,
        })
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// Fetch a comment by id.
pub async fn get_comment(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let comment = state.forum_service.get_comment(*id).await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// List the comments under a post.
pub async fn comments_by_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let comments = state.forum_service.comments_by_post(*post_id).await?;

    Ok(HttpResponse::Ok().json(comments))
}

/// Update a comment.
pub async fn update_comment(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let comment = state.forum_service.update_comment(*id, &body.content).await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Delete a comment.
pub async fn delete_comment(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    state.forum_service.delete_comment(*id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// List all comments.
pub async fn list_comments(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let comments = state.forum_service.comments().await?;

    Ok(HttpResponse::Ok().json(comments))
}

// =============================================================================
// Chat Handlers
// =============================================================================

/// Send a chat message over HTTP.
///
/// Shares the persistence and validation path with the WebSocket hub, and
/// fans the confirmed message out to every live WebSocket session.
pub async fn send_message(
    state: web::Data<AppState>,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let message = state
        .chat_service
        .send(body.user_id, &body.username, &body.content)
        .await?;

    if let Ok(frame) = serde_json::to_string(&message) {
        state.hub.broadcast(&frame);
    }

    Ok(HttpResponse::Created().json(message))
}

/// List the chat history, oldest first.
pub async fn get_messages(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let messages = state.chat_service.history().await?;

    Ok(HttpResponse::Ok().json(messages))
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check endpoint.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "forum-service".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

//! # Gateway Handlers
//!
//! Each handler maps one external endpoint to one downstream RPC, reshaping
//! the request body and overriding server-assigned fields from the
//! authenticated identity.

use actix_web::{web, HttpResponse};
use shared::{errors::ApiError, validation};

use crate::dto::*;
use crate::middleware::AuthenticatedUser;
use crate::AppState;

// =============================================================================
// Auth
// =============================================================================

/// `POST /register` → auth `Register`.
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let tokens = state.auth.register(&body.username, &body.password).await?;

    Ok(HttpResponse::Created().json(tokens))
}

/// `POST /login` → auth `Login`; returns the pair plus the user projection.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let response = state.auth.login(&body.username, &body.password).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// `POST /refresh` → auth `RefreshToken`.
pub async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let tokens = state.auth.refresh(&body.refresh_token).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// `POST /api/logout` → auth `Logout` (revokes every session).
pub async fn logout(
    state: web::Data<AppState>,
    body: web::Json<LogoutRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let message = state.auth.logout(&body.access_token).await?;

    Ok(HttpResponse::Ok().json(message))
}

/// `GET /api/profile` - identity straight from the request context, no
/// downstream call.
pub async fn profile(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ProfileResponse {
        user_id: user.user_id,
        username: user.username,
        is_admin: user.is_admin,
    })
}

// =============================================================================
// Posts
// =============================================================================

/// `GET /posts` → forum `Posts`.
pub async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let posts = state.forum.list_posts().await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// `GET /posts/{id}` → forum `GetPost`.
pub async fn get_post(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let post = state.forum.get_post(*id).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// `POST /api/posts` → forum `CreatePost`.
///
/// `author_id` is server-assigned from the authenticated identity; any
/// value in the client body is ignored by the request type.
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let post = state.forum.create_post(&user, &body.title, &body.content).await?;

    Ok(HttpResponse::Created().json(post))
}

/// `DELETE /api/posts/{id}` → forum `DeletePost`.
pub async fn delete_post(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    state.forum.delete_post(*id).await?;

    Ok(HttpResponse::NoContent().finish())
}

// =============================================================================
// Comments
// =============================================================================

/// `GET /comments/{id}` → forum `GetCommentByID`.
pub async fn get_comment(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let comment = state.forum.get_comment(*id).await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// `GET /comments/post/{post_id}` → forum `GetByPostID`.
pub async fn comments_by_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let comments = state.forum.comments_by_post(*post_id).await?;

    Ok(HttpResponse::Ok().json(comments))
}

/// `POST /api/comments` → forum `CreateComment`, author server-assigned.
pub async fn create_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let comment = state
        .forum
        .create_comment(&user, body.post_id, &body.content)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// `DELETE /api/comments/{id}` → forum `DeleteComment`.
pub async fn delete_comment(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    state.forum.delete_comment(*id).await?;

    Ok(HttpResponse::NoContent().finish())
}

// =============================================================================
// Chat
// =============================================================================

/// `GET /chat` → forum `GetMessages` (public history listing).
pub async fn chat_history(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let messages = state.forum.get_messages().await?;

    Ok(HttpResponse::Ok().json(messages))
}

/// `POST /api/chat` → forum `SendMessage`, author server-assigned.
pub async fn send_chat(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<SendChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let message = state.forum.send_message(&user, &body.content).await?;

    Ok(HttpResponse::Created().json(message))
}

/// `GET /ws/chat` - live chat lives on the forum service; clients are
/// redirected to its WebSocket endpoint.
pub async fn ws_redirect(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::TemporaryRedirect()
        .insert_header(("Location", state.forum_ws_url.clone()))
        .finish()
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check endpoint.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "gateway"
    }))
}

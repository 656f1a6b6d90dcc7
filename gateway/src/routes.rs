//! # Route Configuration
//!
//! The external HTTP surface. Routes under `/api` require a bearer token;
//! everything else is public.
//!
//! ```text
//! /
//! ├── health                      GET    → health_check
//! ├── register                    POST   → register
//! ├── login                       POST   → login
//! ├── refresh                     POST   → refresh
//! ├── posts                       GET    → list_posts
//! ├── posts/{id}                  GET    → get_post
//! ├── comments/{id}               GET    → get_comment
//! ├── comments/post/{post_id}     GET    → comments_by_post
//! ├── chat                        GET    → chat_history
//! ├── ws/chat                     GET    → 307 redirect to the forum WS
//! │
//! └── api/                        (bearer token required)
//!     ├── logout                  POST   → logout
//!     ├── profile                 GET    → profile
//!     ├── posts                   POST   → create_post
//!     ├── posts/{id}              DELETE → delete_post
//!     ├── comments                POST   → create_comment
//!     ├── comments/{id}           DELETE → delete_comment
//!     └── chat                    POST   → send_chat
//! ```

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware::from_fn, web};

use crate::handlers;
use crate::middleware::require_auth;

/// CORS policy for the external surface.
///
/// Wildcard origin (development posture) with an explicit method and
/// header allowlist. Preflight requests are answered here without touching
/// the downstream services.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec!["GET", "POST", "OPTIONS", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(3600)
}

/// Configures all gateway routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(handlers::health_check))
        // ─────────────────────────────────────────────────────────────────
        // Public routes
        // ─────────────────────────────────────────────────────────────────
        .route("/register", web::post().to(handlers::register))
        .route("/login", web::post().to(handlers::login))
        .route("/refresh", web::post().to(handlers::refresh))
        .route("/posts", web::get().to(handlers::list_posts))
        .route("/posts/{id}", web::get().to(handlers::get_post))
        .route("/comments/post/{post_id}", web::get().to(handlers::comments_by_post))
        .route("/comments/{id}", web::get().to(handlers::get_comment))
        .route("/chat", web::get().to(handlers::chat_history))
        .route("/ws/chat", web::get().to(handlers::ws_redirect))
        // ─────────────────────────────────────────────────────────────────
        // Protected routes - bearer token validated against the auth
        // service, identity attached to the request context
        // ─────────────────────────────────────────────────────────────────
        .service(
            web::scope("/api")
                .wrap(from_fn(require_auth))
                .route("/logout", web::post().to(handlers::logout))
                .route("/profile", web::get().to(handlers::profile))
                .route("/posts", web::post().to(handlers::create_post))
                .route("/posts/{id}", web::delete().to(handlers::delete_post))
                .route("/comments", web::post().to(handlers::create_comment))
                .route("/comments/{id}", web::delete().to(handlers::delete_comment))
                .route("/chat", web::post().to(handlers::send_chat)),
        );
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{AuthClient, ForumClient};
    use crate::AppState;
    use actix_web::{test, App};
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state(auth_url: &str, forum_url: &str) -> web::Data<AppState> {
        web::Data::new(AppState {
            auth: AuthClient::new(auth_url, Duration::from_secs(2)),
            forum: ForumClient::new(forum_url, Duration::from_secs(2)),
            forum_ws_url: "ws://localhost:8002/ws/chat".to_string(),
        })
    }

    /// Stubs a successful validation for "good-token" as alice (id 1).
    async fn stub_valid_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/validate"))
            .and(body_json(serde_json::json!({ "access_token": "good-token" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user_id": 1,
                "username": "alice",
                "is_admin": false,
                "is_valid": true
            })))
            .mount(server)
            .await;
    }

    #[actix_web::test]
    async fn test_protected_route_without_token_is_401() {
        let auth = MockServer::start().await;
        let forum = MockServer::start().await;

        let app = test::init_service(
            App::new()
                .app_data(state(&auth.uri(), &forum.uri()))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::get().uri("/api/profile").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), 401);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "MISSING_AUTH");
    }

    #[actix_web::test]
    async fn test_profile_returns_identity_from_context() {
        let auth = MockServer::start().await;
        let forum = MockServer::start().await;
        stub_valid_token(&auth).await;

        let app = test::init_service(
            App::new()
                .app_data(state(&auth.uri(), &forum.uri()))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/api/profile")
            .insert_header(("Authorization", "Bearer good-token"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), 200);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["user_id"], 1);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["is_admin"], false);
    }

    #[actix_web::test]
    async fn test_expired_token_kind_reaches_the_client() {
        let auth = MockServer::start().await;
        let forum = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/validate"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "TOKEN_EXPIRED",
                "message": "Token expired",
                "timestamp": "2026-01-15T10:30:00Z"
            })))
            .mount(&auth)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(state(&auth.uri(), &forum.uri()))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/api/profile")
            .insert_header(("Authorization", "Bearer stale-token"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), 401);

        // The client can tell "refresh" from "re-login"
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "TOKEN_EXPIRED");
    }

    #[actix_web::test]
    async fn test_create_post_author_is_server_assigned() {
        let auth = MockServer::start().await;
        let forum = MockServer::start().await;
        stub_valid_token(&auth).await;

        // The forwarded body must carry alice's identity, not the body's
        Mock::given(method("POST"))
            .and(path("/api/v1/posts"))
            .and(body_json(serde_json::json!({
                "title": "Hello",
                "content": "First post",
                "author_id": 1,
                "username": "alice"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 1,
                "title": "Hello",
                "content": "First post",
                "author_id": 1,
                "username": "alice",
                "created_at": "2026-01-15T10:30:00Z",
                "updated_at": null,
                "comment_count": 0
            })))
            .expect(1)
            .mount(&forum)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(state(&auth.uri(), &forum.uri()))
                .configure(configure),
        )
        .await;

        // The client tries to post as user 999; the field is not part of
        // the request type and is ignored
        let request = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("Authorization", "Bearer good-token"))
            .set_json(serde_json::json!({
                "title": "Hello",
                "content": "First post",
                "author_id": 999
            }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), 201);
    }

    #[actix_web::test]
    async fn test_public_listing_needs_no_token() {
        let auth = MockServer::start().await;
        let forum = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&forum)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(state(&auth.uri(), &forum.uri()))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::get().uri("/posts").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), 200);
    }

    #[actix_web::test]
    async fn test_cors_preflight_short_circuits() {
        let auth = MockServer::start().await;
        let forum = MockServer::start().await;

        // Downstream must never see the preflight
        Mock::given(method("POST"))
            .and(path("/api/v1/posts"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&forum)
            .await;

        let app = test::init_service(
            App::new()
                .wrap(cors())
                .app_data(state(&auth.uri(), &forum.uri()))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::with_uri("/api/posts")
            .method(actix_web::http::Method::OPTIONS)
            .insert_header(("Origin", "http://localhost:3000"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .insert_header(("Access-Control-Request-Headers", "authorization,content-type"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[actix_web::test]
    async fn test_ws_chat_redirects_to_forum_endpoint() {
        let auth = MockServer::start().await;
        let forum = MockServer::start().await;

        let app = test::init_service(
            App::new()
                .app_data(state(&auth.uri(), &forum.uri()))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::get().uri("/ws/chat").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), 307);
        assert_eq!(
            response.headers().get("Location").and_then(|v| v.to_str().ok()),
            Some("ws://localhost:8002/ws/chat")
        );
    }
}

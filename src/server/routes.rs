// src/server/routes.rs
//! Axum router configuration for the Ladle server
//!
//! Two route groups:
//! - Public: register/login/reset, every read endpoint, /health
//! - Protected: every state-mutating endpoint, behind the verified-token
//!   middleware (the caller identity from the token is authoritative;
//!   body-supplied user IDs are ignored)
//!
//! Uploaded recipe photos are served statically under /uploads.

use crate::server::handlers::{auth as auth_handlers, comments, ingredients, recipes, users};
use crate::server::{auth, ServerState};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Create the main application router
pub fn create_router(state: Arc<ServerState>) -> Router {
    // CORS configuration - permissive, any frontend origin may call the API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Accounts
        .route("/login", post(auth_handlers::login))
        .route("/register", post(auth_handlers::register))
        .route("/forgot-password", post(auth_handlers::forgot_password))
        // Recipe reads
        .route("/recipes", get(recipes::list_all))
        .route("/recipes/search", get(recipes::search))
        .route("/recipes/user/:id", get(recipes::list_by_author))
        // Comment reads
        .route("/recipes/:id/comments", get(comments::count))
        .route("/recipes/:id/comments/list", get(comments::list))
        // Directory reads
        .route("/users", get(users::list))
        .route("/ingredients", get(ingredients::list));

    let protected_routes = Router::new()
        .route("/update-profile", put(auth_handlers::update_profile))
        .route("/recipes/add", post(recipes::create))
        .route("/recipes/update/:id", put(recipes::update))
        .route("/recipes/delete/:id", put(recipes::delete))
        .route("/recipes/:id/comments/add", post(comments::add))
        .route("/users/delete/:id", put(users::deactivate))
        .route("/users/active/:id", put(users::activate))
        .route("/ingredients/delete/:id", put(ingredients::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::server::ServerConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> Arc<ServerState> {
        let config = ServerConfig {
            jwt_secret: "test-secret".to_string(),
            ..ServerConfig::default()
        };
        let db = Database::open_in_memory().unwrap();
        Arc::new(ServerState::new(config, db))
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mutating_route_requires_token() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/recipes/delete/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_read_routes_are_public() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/recipes").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}

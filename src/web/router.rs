//! Router configuration for the HTTP interface.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    connect, disconnect, get_file_data, get_index, get_show, post_upload, put_publish,
    put_unpublish, AppState,
};
use super::middleware::{create_cors_layer, session_auth};

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let auth_routes = Router::new()
        .route("/connect", get(connect))
        .route("/disconnect", get(disconnect));

    let file_routes = Router::new()
        .route("/files", post(post_upload).get(get_index))
        .route("/files/:id", get(get_show))
        .route("/files/:id/publish", put(put_publish))
        .route("/files/:id/unpublish", put(put_unpublish))
        .route("/files/:id/data", get(get_file_data));

    let sessions = app_state.sessions.clone();

    Router::new()
        .merge(auth_routes)
        .merge(file_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let sessions = sessions.clone();
                    session_auth(sessions, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

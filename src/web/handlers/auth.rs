//! Authentication handlers.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::auth::{verify_credentials, SessionStore};
use crate::file::FileStorage;
use crate::queue::ProcessingDispatcher;
use crate::web::dto::TokenResponse;
use crate::web::error::ApiError;
use crate::web::middleware::token_from_headers;
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Users and file records.
    pub db: Database,
    /// Session tokens.
    pub sessions: SessionStore,
    /// Content blobs and folder directories.
    pub storage: FileStorage,
    /// Image post-processing.
    pub dispatcher: ProcessingDispatcher,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Database,
        sessions: SessionStore,
        storage: FileStorage,
        dispatcher: ProcessingDispatcher,
    ) -> Self {
        Self {
            db,
            sessions,
            storage,
            dispatcher,
        }
    }
}

/// GET /connect - Exchange Basic credentials for a session token.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(ApiError::unauthorized)?;

    let user_id = verify_credentials(&state.db, header).await?;
    let token = state.sessions.create(user_id)?;

    Ok(Json(TokenResponse { token }))
}

/// GET /disconnect - End the session named by `X-Token`.
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = token_from_headers(&headers).ok_or_else(ApiError::unauthorized)?;

    if state.sessions.revoke(token)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::unauthorized())
    }
}

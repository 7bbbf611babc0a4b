//! Session token authentication.
//!
//! Clients send the token from `/connect` in the `X-Token` header. The
//! [`SessionStore`] reaches the extractors through request extensions,
//! inserted by [`session_auth`].

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::auth::SessionStore;
use crate::web::error::ApiError;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-token";

/// The session token sent with a request, if any.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
}

fn session_store(parts: &Parts) -> Result<&SessionStore, ApiError> {
    parts.extensions.get::<SessionStore>().ok_or_else(|| {
        tracing::error!("Session store not configured");
        ApiError::internal()
    })
}

/// Extractor for authenticated users.
///
/// Rejects with 401 when the token is missing, unknown or expired.
/// A failing session cache is a 500, not a 401.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser(pub i64);

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = token_from_headers(&parts.headers).ok_or_else(ApiError::unauthorized)?;
            let sessions = session_store(parts)?;

            match sessions.resolve(token)? {
                Some(user_id) => Ok(SessionUser(user_id)),
                None => {
                    tracing::debug!("Rejected unknown or expired session token");
                    Err(ApiError::unauthorized())
                }
            }
        })
    }
}

/// Optional authentication extractor.
///
/// Like [`SessionUser`] but yields `None` instead of rejecting when there is
/// no valid session.
#[derive(Debug, Clone, Copy)]
pub struct OptionalSessionUser(pub Option<i64>);

impl<S> FromRequestParts<S> for OptionalSessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let Some(token) = token_from_headers(&parts.headers) else {
                return Ok(OptionalSessionUser(None));
            };
            let sessions = session_store(parts)?;

            Ok(OptionalSessionUser(sessions.resolve(token)?))
        })
    }
}

/// Middleware function to inject the session store into request extensions.
pub async fn session_auth(
    sessions: SessionStore,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(sessions);
    next.run(request).await
}

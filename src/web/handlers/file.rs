//! File handlers.

use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::{FileService, Projection, UploadRequest};
use crate::web::dto::{DataQuery, IndexQuery, UploadFileRequest};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{OptionalSessionUser, SessionUser};

fn service(state: &AppState) -> FileService<'_> {
    FileService::new(&state.db, &state.storage, &state.dispatcher)
}

/// A record ID from the path. Anything that is not an ID names no record.
fn record_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::not_found())
}

/// POST /files - Upload a file, image or folder.
pub async fn post_upload(
    State(state): State<Arc<AppState>>,
    SessionUser(user_id): SessionUser,
    body: Result<Json<UploadFileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Projection>), ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected upload body");
        ApiError::bad_request("Invalid request body")
    })?;
    let request = UploadRequest::try_from(body)?;

    let projection = service(&state).upload(user_id, &request).await?;

    Ok((StatusCode::CREATED, Json(projection)))
}

/// GET /files/:id - Show one of the caller's records.
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    SessionUser(user_id): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Projection>, ApiError> {
    let id = record_id(path)?;
    Ok(Json(service(&state).show(user_id, id).await?))
}

/// GET /files - List the caller's records, 20 per page.
pub async fn get_index(
    State(state): State<Arc<AppState>>,
    SessionUser(user_id): SessionUser,
    query: Result<Query<IndexQuery>, QueryRejection>,
) -> Result<Json<Vec<Projection>>, ApiError> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e, "Rejected listing query");
        ApiError::bad_request("Invalid query")
    })?;

    let page = service(&state)
        .index(user_id, query.parent_filter(), query.page())
        .await?;

    Ok(Json(page))
}

/// PUT /files/:id/publish - Make a record public.
pub async fn put_publish(
    State(state): State<Arc<AppState>>,
    SessionUser(user_id): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Projection>, ApiError> {
    let id = record_id(path)?;
    Ok(Json(service(&state).set_visibility(user_id, id, true).await?))
}

/// PUT /files/:id/unpublish - Make a record private.
pub async fn put_unpublish(
    State(state): State<Arc<AppState>>,
    SessionUser(user_id): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Projection>, ApiError> {
    let id = record_id(path)?;
    Ok(Json(service(&state).set_visibility(user_id, id, false).await?))
}

/// GET /files/:id/data - Raw content of a file or image.
///
/// Public records are served to anyone; private ones only to their owner.
pub async fn get_file_data(
    State(state): State<Arc<AppState>>,
    OptionalSessionUser(caller): OptionalSessionUser,
    path: Result<Path<i64>, PathRejection>,
    _query: Option<Query<DataQuery>>,
) -> Result<Response, ApiError> {
    let id = record_id(path)?;
    let result = service(&state).retrieve_content(caller, id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .body(Body::from(result.content))
        .map_err(|e| {
            tracing::error!(file_id = id, error = %e, "Failed to build content response");
            ApiError::internal()
        })
}

//! Tag HTTP handlers.

use crate::{auth::AuthUser, error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use snippetbox_core::models::{CreateTagRequest, Tag, TagPatch, UpdateTagRequest};

/// Create a tag owned by the caller.
///
/// # Errors
/// Returns `400` on invalid fields or `409` when the name is already used.
pub async fn create_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), HttpError> {
    let tag = req.into_tag(&user.user_id)?;
    let tag = state.tags.create(tag)?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// List the caller's tags sorted by name.
pub async fn list_tags(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Tag>>, HttpError> {
    Ok(Json(state.tags.list(&user.user_id)?))
}

pub async fn get_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Tag>, HttpError> {
    Ok(Json(state.tags.get(&user.user_id, &id)?))
}

/// Rename or recolor one of the caller's tags.
pub async fn update_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateTagRequest>,
) -> Result<Json<Tag>, HttpError> {
    let patch = TagPatch::try_from(req)?;
    Ok(Json(state.tags.update(&user.user_id, &id, patch)?))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, HttpError> {
    state.tags.delete(&user.user_id, &id)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

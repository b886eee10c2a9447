//! Snippet HTTP handlers.

use crate::{auth::AuthUser, error::HttpError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use snippetbox_core::models::language::UnknownLanguage;
use snippetbox_core::models::{
    CreateSnippetRequest, ListSnippetsQuery, NewSnippet, ProgrammingLanguage, Snippet,
    SnippetPatch, UpdateSnippetRequest,
};
use snippetbox_core::query::{Pagination, SnippetFilters, SnippetPage, SnippetSort};
use snippetbox_core::text::normalize_optional_nonempty;
use snippetbox_core::{AppError, Config};

fn ensure_code_size(code: &str, max_snippet_size: usize) -> Result<(), AppError> {
    if code.len() > max_snippet_size {
        return Err(AppError::Validation(format!(
            "Code exceeds maximum size of {} bytes",
            max_snippet_size
        )));
    }
    Ok(())
}

/// Resolve raw list parameters into query inputs, applying configured page limits.
fn list_params(
    query: ListSnippetsQuery,
    config: &Config,
) -> Result<(SnippetFilters, Pagination, SnippetSort), AppError> {
    let language: Option<ProgrammingLanguage> = normalize_optional_nonempty(query.language)
        .map(|raw| raw.parse())
        .transpose()
        .map_err(|err: UnknownLanguage| AppError::Validation(err.to_string()))?;
    let filters = SnippetFilters {
        search: query.search.filter(|search| !search.trim().is_empty()),
        language,
        tag: normalize_optional_nonempty(query.tag),
    };
    let limit = query
        .limit
        .unwrap_or(config.default_page_limit)
        .min(config.max_page_limit);
    let pagination = Pagination::new(query.page.unwrap_or(1), limit)?;
    let sort = SnippetSort::parse(query.sort_by.as_deref(), query.sort_direction.as_deref())?;
    Ok((filters, pagination, sort))
}

/// Create a snippet owned by the caller.
///
/// # Returns
/// `201 Created` with the stored snippet.
///
/// # Errors
/// Returns an error if validation or persistence fails.
pub async fn create_snippet(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateSnippetRequest>,
) -> Result<(StatusCode, Json<Snippet>), HttpError> {
    ensure_code_size(&req.code, state.config.max_snippet_size)?;
    let fields = NewSnippet::try_from(req)?;
    let snippet = state.lifecycle.create(&user.user_id, fields)?;
    Ok((StatusCode::CREATED, Json(snippet)))
}

/// List the caller's snippets with search, filters, sorting, and pagination.
///
/// # Errors
/// Returns an error for invalid query parameters or storage failures.
pub async fn list_snippets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListSnippetsQuery>,
) -> Result<Json<SnippetPage>, HttpError> {
    let (filters, pagination, sort) = list_params(query, &state.config)?;
    let page = state
        .queries
        .list_snippets(&user.user_id, &filters, pagination, sort)?;
    Ok(Json(page))
}

/// Fetch one of the caller's snippets.
pub async fn get_snippet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Snippet>, HttpError> {
    Ok(Json(state.queries.get_snippet(&user.user_id, &id)?))
}

/// Update one of the caller's snippets.
///
/// # Errors
/// Returns `404` when missing, `403` for another user's snippet, or `400` on
/// invalid fields.
pub async fn update_snippet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateSnippetRequest>,
) -> Result<Json<Snippet>, HttpError> {
    if let Some(code) = req.code.as_deref() {
        ensure_code_size(code, state.config.max_snippet_size)?;
    }
    let patch = SnippetPatch::try_from(req)?;
    let snippet = state.lifecycle.update(&user.user_id, &id, patch)?;
    Ok(Json(snippet))
}

/// Delete one of the caller's snippets.
pub async fn delete_snippet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, HttpError> {
    state.lifecycle.delete(&user.user_id, &id)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// List another user's public snippets. No caller identity required.
pub async fn list_public_snippets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Snippet>>, HttpError> {
    Ok(Json(state.queries.list_public_snippets(&user_id)?))
}

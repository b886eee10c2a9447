//! HTTP error mapping for API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use snippetbox_core::AppError;

/// Handler error rendered as `{ "error": message }`.
#[derive(Debug)]
pub enum HttpError {
    /// Domain or storage failure from the core.
    App(AppError),
    /// Request carried no usable caller identity.
    Unauthorized(&'static str),
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl HttpError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, (*message).to_string()),
            Self::App(AppError::Validation(message)) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::App(AppError::NotFound) => (StatusCode::NOT_FOUND, "Not found".to_string()),
            Self::App(AppError::Forbidden(message)) => (StatusCode::FORBIDDEN, message.clone()),
            Self::App(AppError::Conflict(message)) => (StatusCode::CONFLICT, message.clone()),
            Self::App(err) => {
                tracing::error!("Internal error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

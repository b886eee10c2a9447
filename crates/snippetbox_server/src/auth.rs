//! Caller identity extraction.
//!
//! Authentication happens upstream; by the time a request reaches this
//! service the validated user id travels in the `x-user-id` header.

use crate::error::HttpError;
use axum::{extract::FromRequestParts, http::request::Parts};
use snippetbox_core::constants::USER_ID_HEADER;

/// Extractor for the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(HttpError::Unauthorized("User authentication required"))?;
        Ok(Self {
            user_id: user_id.to_string(),
        })
    }
}

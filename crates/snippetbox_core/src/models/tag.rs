//! User-scoped tags with a live snippet reference count.

use super::validation::{validate_create_tag, validate_update_tag};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag row stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub user_id: String,
    /// Number of the owner's snippets currently referencing this tag.
    #[serde(default)]
    pub snippet_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// Request payload for updating a tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Validated partial tag update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl Tag {
    /// Create a tag owned by `user_id` with a zero count.
    pub fn new(user_id: &str, name: String, color: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            color,
            user_id: user_id.to_string(),
            snippet_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Key used for the per-owner name uniqueness index.
    pub fn name_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

impl CreateTagRequest {
    /// Validate and build a tag owned by `user_id`.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when name or color are invalid.
    pub fn into_tag(self, user_id: &str) -> Result<Tag, AppError> {
        validate_create_tag(&self).into_result()?;
        Ok(Tag::new(
            user_id,
            self.name.trim().to_string(),
            self.color.trim().to_string(),
        ))
    }
}

impl TryFrom<UpdateTagRequest> for TagPatch {
    type Error = AppError;

    fn try_from(req: UpdateTagRequest) -> Result<Self, Self::Error> {
        validate_update_tag(&req).into_result()?;
        Ok(Self {
            name: req.name.map(|name| name.trim().to_string()),
            color: req.color.map(|color| color.trim().to_string()),
        })
    }
}

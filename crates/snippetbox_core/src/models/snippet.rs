//! Snippet records and the request payloads that create or modify them.

use super::language::{ProgrammingLanguage, UnknownLanguage};
use super::validation::{validate_create_snippet, validate_update_snippet};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_public() -> bool {
    true
}

/// Snippet row stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub title: String,
    pub description: String,
    pub code: String,
    pub programming_language: ProgrammingLanguage,
    /// Tag ids in caller order. Duplicates are tolerated here; the ledger
    /// counts each distinct id once.
    pub tags: Vec<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub favorites: u64,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a snippet that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnippet {
    pub title: String,
    pub description: String,
    pub code: String,
    pub programming_language: ProgrammingLanguage,
    pub tags: Vec<String>,
    pub is_public: bool,
}

/// Validated partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub programming_language: Option<ProgrammingLanguage>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

/// Request payload for creating a snippet.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSnippetRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    pub programming_language: String,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

/// Request payload for updating a snippet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSnippetRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub programming_language: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

/// Raw query parameters accepted by the snippet list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnippetsQuery {
    pub search: Option<String>,
    pub language: Option<String>,
    pub tag: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

impl Snippet {
    /// Build a new snippet owned by `user_id` with fresh id and timestamps.
    pub fn new(user_id: &str, fields: NewSnippet) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            code: fields.code,
            programming_language: fields.programming_language,
            tags: fields.tags,
            is_public: fields.is_public,
            favorites: 0,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` owns this snippet.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Apply `patch` and refresh `updated_at`, even when the patch is empty.
    pub fn apply_patch(&mut self, patch: &SnippetPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(code) = &patch.code {
            self.code = code.clone();
        }
        if let Some(language) = patch.programming_language {
            self.programming_language = language;
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(is_public) = patch.is_public {
            self.is_public = is_public;
        }
        // Keep updated_at monotonic when two writes land within one clock tick.
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::milliseconds(1)
        };
    }
}

impl TryFrom<CreateSnippetRequest> for NewSnippet {
    type Error = AppError;

    fn try_from(req: CreateSnippetRequest) -> Result<Self, Self::Error> {
        validate_create_snippet(&req).into_result()?;
        let programming_language: ProgrammingLanguage = req
            .programming_language
            .parse()
            .map_err(|err: UnknownLanguage| AppError::Validation(err.to_string()))?;
        Ok(Self {
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            code: req.code,
            programming_language,
            tags: clean_tags(req.tags.unwrap_or_default()),
            is_public: req.is_public.unwrap_or(true),
        })
    }
}

impl TryFrom<UpdateSnippetRequest> for SnippetPatch {
    type Error = AppError;

    fn try_from(req: UpdateSnippetRequest) -> Result<Self, Self::Error> {
        validate_update_snippet(&req).into_result()?;
        let programming_language: Option<ProgrammingLanguage> = req
            .programming_language
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|err: UnknownLanguage| AppError::Validation(err.to_string()))?;
        Ok(Self {
            title: req.title.map(|title| title.trim().to_string()),
            description: req.description.map(|description| description.trim().to_string()),
            code: req.code,
            programming_language,
            tags: req.tags.map(clean_tags),
            is_public: req.is_public,
        })
    }
}

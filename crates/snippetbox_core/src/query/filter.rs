//! Predicate, sort, and pagination value objects for snippet queries.

use crate::error::AppError;
use crate::models::{ProgrammingLanguage, Snippet};
use crate::text::contains_case_insensitive;
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

/// Conjunctive snippet predicate.
///
/// The owner clause is fixed at construction and cannot be cleared, so every
/// query built from a filter is confined to one user's snippets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetFilter {
    owner_id: String,
    search_lower: Option<String>,
    language: Option<ProgrammingLanguage>,
    tag: Option<String>,
    public_only: bool,
}

impl SnippetFilter {
    /// Filter matching every snippet owned by `owner_id`.
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            search_lower: None,
            language: None,
            tag: None,
            public_only: false,
        }
    }

    /// Require `search` as a case-insensitive substring of title or description.
    /// Whitespace inside the needle is significant; all-blank input leaves the
    /// filter unchanged.
    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search_lower = search
            .filter(|value| !value.trim().is_empty())
            .map(str::to_lowercase);
        self
    }

    /// Require an exact programming language.
    pub fn with_language(mut self, language: Option<ProgrammingLanguage>) -> Self {
        self.language = language;
        self
    }

    /// Require the tag id to appear in the snippet's tag list.
    pub fn with_tag(mut self, tag: Option<&str>) -> Self {
        self.tag = tag
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        self
    }

    /// Restrict to snippets flagged public.
    pub fn public_only(mut self) -> Self {
        self.public_only = true;
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Evaluate the predicate against one snippet.
    pub fn matches(&self, snippet: &Snippet) -> bool {
        if snippet.user_id != self.owner_id {
            return false;
        }
        if self.public_only && !snippet.is_public {
            return false;
        }
        if let Some(language) = self.language {
            if snippet.programming_language != language {
                return false;
            }
        }
        if let Some(tag) = self.tag.as_deref() {
            if !snippet.tags.iter().any(|candidate| candidate == tag) {
                return false;
            }
        }
        if let Some(needle) = self.search_lower.as_deref() {
            return contains_case_insensitive(&snippet.title, needle)
                || contains_case_insensitive(&snippet.description, needle);
        }
        true
    }
}

/// Field a snippet listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    ProgrammingLanguage,
    Favorites,
}

impl FromStr for SortField {
    type Err = AppError;

    /// Accepts camelCase and snake_case spellings.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "").as_str() {
            "createdat" => Ok(Self::CreatedAt),
            "updatedat" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            "programminglanguage" | "language" => Ok(Self::ProgrammingLanguage),
            "favorites" => Ok(Self::Favorites),
            _ => Err(AppError::Validation(format!(
                "Unsupported sortBy '{}'",
                value.trim()
            ))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(Self::Asc),
            "desc" | "descending" | "-1" => Ok(Self::Desc),
            _ => Err(AppError::Validation(format!(
                "Unsupported sortDirection '{}'",
                value.trim()
            ))),
        }
    }
}

/// Ordering for a snippet listing. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnippetSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SnippetSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parse optional raw `sortBy` / `sortDirection` values.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for unknown field or direction names.
    pub fn parse(sort_by: Option<&str>, sort_direction: Option<&str>) -> Result<Self, AppError> {
        let field = match sort_by.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => raw.parse()?,
            None => SortField::default(),
        };
        let direction = match sort_direction.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => raw.parse()?,
            None => SortDirection::default(),
        };
        Ok(Self { field, direction })
    }

    /// Total order: the sort field in the requested direction, then id ascending.
    pub fn compare(&self, a: &Snippet, b: &Snippet) -> Ordering {
        let primary = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
            SortField::ProgrammingLanguage => a
                .programming_language
                .as_str()
                .cmp(b.programming_language.as_str()),
            SortField::Favorites => a.favorites.cmp(&b.favorites),
        };
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Requested page window. Both values are 1-based and positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: crate::constants::DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    /// # Errors
    /// Returns [`AppError::Validation`] when `page` or `limit` is zero.
    pub fn new(page: usize, limit: usize) -> Result<Self, AppError> {
        if page == 0 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(AppError::Validation("limit must be at least 1".to_string()));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Rows to skip before the page starts.
    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`, never below 1.
    pub fn total_pages(&self, total_count: usize) -> usize {
        total_count.div_ceil(self.limit).max(1)
    }
}

/// Fully resolved query handed to [`crate::store::SnippetStore::find_many`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetQuery {
    pub filter: SnippetFilter,
    pub sort: SnippetSort,
    pub skip: usize,
    pub limit: usize,
}

impl SnippetQuery {
    /// Sort `candidates` (already filtered) and cut out the requested window.
    ///
    /// Shared by store implementations that filter in memory.
    pub fn paginate(&self, mut candidates: Vec<Snippet>) -> Vec<Snippet> {
        candidates.sort_by(|a, b| self.sort.compare(a, b));
        candidates
            .into_iter()
            .skip(self.skip)
            .take(self.limit)
            .collect()
    }
}

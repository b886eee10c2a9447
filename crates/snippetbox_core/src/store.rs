//! Persistence collaborator contract consumed by the snippet services.
//!
//! Services hold their stores behind `Arc<S>` and never reach for a global
//! handle, so tests can swap in doubles. The redb implementations live in
//! [`crate::db`].

use crate::error::AppError;
use crate::models::{Snippet, SnippetPatch, Tag, TagPatch};
use crate::query::{SnippetFilter, SnippetQuery};

/// Outcome of a single counter increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountUpdate {
    /// The counter now holds this value.
    Applied(u64),
    /// The decrement would have gone below zero; the counter was pinned at 0.
    Clamped,
    /// No tag with that id belongs to the given owner.
    Missing,
}

/// Snippet persistence operations.
pub trait SnippetStore: Send + Sync {
    /// Return the page of snippets described by `query`, already filtered,
    /// sorted, skipped, and limited.
    fn find_many(&self, query: &SnippetQuery) -> Result<Vec<Snippet>, AppError>;

    /// Count snippets matching `filter`.
    fn count(&self, filter: &SnippetFilter) -> Result<usize, AppError>;

    /// Return the requested page together with the filtered total.
    ///
    /// Stores with read snapshots should take both from one snapshot so the
    /// total always agrees with the page.
    fn find_page(&self, query: &SnippetQuery) -> Result<(Vec<Snippet>, usize), AppError> {
        let total_count = self.count(&query.filter)?;
        if query.skip >= total_count {
            return Ok((Vec::new(), total_count));
        }
        Ok((self.find_many(query)?, total_count))
    }

    /// Fetch a snippet by id regardless of owner.
    fn find_one(&self, id: &str) -> Result<Option<Snippet>, AppError>;

    /// Insert a new snippet. Fails when the id already exists.
    fn insert(&self, snippet: &Snippet) -> Result<(), AppError>;

    /// Apply `patch` to an existing snippet, refreshing `updated_at`.
    ///
    /// Returns `Ok(None)` when the snippet does not exist.
    fn update_by_id(&self, id: &str, patch: &SnippetPatch) -> Result<Option<Snippet>, AppError>;

    /// Remove a snippet, returning the removed row.
    fn delete_by_id(&self, id: &str) -> Result<Option<Snippet>, AppError>;

    /// Visit every snippet, optionally restricted to one owner.
    fn scan(
        &self,
        owner_id: Option<&str>,
        on_snippet: &mut dyn FnMut(&Snippet) -> Result<(), AppError>,
    ) -> Result<(), AppError>;
}

/// Tag persistence operations.
pub trait TagStore: Send + Sync {
    /// Insert a new tag. Fails with [`AppError::Conflict`] when the owner already
    /// has a tag with the same name.
    fn insert(&self, tag: &Tag) -> Result<(), AppError>;

    /// Fetch a tag by id regardless of owner.
    fn find_one(&self, id: &str) -> Result<Option<Tag>, AppError>;

    /// List tags sorted by name, optionally restricted to one owner.
    fn list(&self, owner_id: Option<&str>) -> Result<Vec<Tag>, AppError>;

    /// Apply `patch`, keeping the (name, owner) pair unique.
    fn update_by_id(&self, id: &str, patch: &TagPatch) -> Result<Option<Tag>, AppError>;

    /// Remove a tag, returning the removed row.
    fn delete_by_id(&self, id: &str) -> Result<Option<Tag>, AppError>;

    /// Atomically add `delta` to the tag's `snippet_count`, scoped to `owner_id`.
    fn increment_count(&self, id: &str, owner_id: &str, delta: i64)
        -> Result<CountUpdate, AppError>;

    /// Overwrite the tag's `snippet_count`. Returns `false` when the tag is missing.
    fn set_count(&self, id: &str, owner_id: &str, count: u64) -> Result<bool, AppError>;
}

/// Reject a blank user id before it reaches any predicate.
pub(crate) fn require_user_id(user_id: &str) -> Result<&str, AppError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("User id is required".to_string()));
    }
    Ok(trimmed)
}

/// Load a snippet and verify `user_id` owns it.
///
/// # Errors
/// [`AppError::NotFound`] when missing, [`AppError::Forbidden`] when another
/// user owns it.
pub(crate) fn load_owned_snippet<S: SnippetStore + ?Sized>(
    store: &S,
    user_id: &str,
    snippet_id: &str,
) -> Result<Snippet, AppError> {
    let snippet = store.find_one(snippet_id)?.ok_or(AppError::NotFound)?;
    if !snippet.is_owned_by(user_id) {
        return Err(AppError::Forbidden(
            "Not authorized to access this snippet".to_string(),
        ));
    }
    Ok(snippet)
}

/// Load a tag and verify `user_id` owns it.
pub(crate) fn load_owned_tag<T: TagStore + ?Sized>(
    store: &T,
    user_id: &str,
    tag_id: &str,
) -> Result<Tag, AppError> {
    let tag = store.find_one(tag_id)?.ok_or(AppError::NotFound)?;
    if tag.user_id != user_id {
        return Err(AppError::Forbidden(
            "Not authorized to access this tag".to_string(),
        ));
    }
    Ok(tag)
}

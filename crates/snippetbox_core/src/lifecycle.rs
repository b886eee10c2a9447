//! Snippet create/update/delete orchestration with tag count bookkeeping.
//!
//! A snippet write and the tag count adjustments that follow it are separate
//! storage steps. Count failures are logged and do not undo or fail the
//! snippet write; [`TagLedger::reconcile`] repairs any resulting drift.

use crate::error::AppError;
use crate::ledger::{CountDelta, TagLedger};
use crate::models::{NewSnippet, Snippet, SnippetPatch};
use crate::store::{load_owned_snippet, require_user_id, SnippetStore, TagStore};
use std::collections::HashSet;
use std::sync::Arc;

/// Tags in `from` that do not appear in `other`.
fn tags_missing_from(from: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    from.iter()
        .filter(|tag| !other.contains(tag.as_str()))
        .cloned()
        .collect()
}

/// Mutating snippet operations for one storage backend.
pub struct SnippetLifecycle<S, T> {
    snippets: Arc<S>,
    ledger: TagLedger<T>,
}

impl<S, T> Clone for SnippetLifecycle<S, T> {
    fn clone(&self) -> Self {
        Self {
            snippets: Arc::clone(&self.snippets),
            ledger: self.ledger.clone(),
        }
    }
}

impl<S: SnippetStore, T: TagStore> SnippetLifecycle<S, T> {
    pub fn new(snippets: Arc<S>, ledger: TagLedger<T>) -> Self {
        Self { snippets, ledger }
    }

    fn adjust_logged(&self, tag_ids: &[String], user_id: &str, delta: CountDelta, op: &str) {
        if tag_ids.is_empty() {
            return;
        }
        if let Err(err) = self.ledger.adjust(tag_ids, user_id, delta) {
            tracing::error!(
                user_id,
                operation = op,
                ?delta,
                "tag count update failed; counts may drift until reconcile: {}",
                err
            );
        }
    }

    /// Store a new snippet for `user_id` and bump the counts of its tags.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a blank user id, or the storage
    /// error when the insert fails. Count failures are only logged.
    pub fn create(&self, user_id: &str, fields: NewSnippet) -> Result<Snippet, AppError> {
        let user_id = require_user_id(user_id)?;
        let snippet = Snippet::new(user_id, fields);
        self.snippets.insert(&snippet)?;
        tracing::info!(
            snippet_id = snippet.id.as_str(),
            user_id,
            tags = snippet.tags.len(),
            "created snippet"
        );
        self.adjust_logged(&snippet.tags, user_id, CountDelta::Increment, "create");
        Ok(snippet)
    }

    /// Apply `patch` to a snippet the user owns.
    ///
    /// When the patch carries a tag list, tags only in the old list are
    /// decremented and tags only in the new list incremented. Counts are
    /// adjusted before the snippet row is written.
    ///
    /// # Errors
    /// [`AppError::NotFound`] / [`AppError::Forbidden`] from the ownership
    /// check, [`AppError::NotFound`] if the snippet disappears before the
    /// write, or a storage error from the write itself.
    pub fn update(
        &self,
        user_id: &str,
        snippet_id: &str,
        patch: SnippetPatch,
    ) -> Result<Snippet, AppError> {
        let user_id = require_user_id(user_id)?;
        let existing = load_owned_snippet(self.snippets.as_ref(), user_id, snippet_id)?;

        if let Some(new_tags) = patch.tags.as_deref() {
            let removed = tags_missing_from(&existing.tags, new_tags);
            let added = tags_missing_from(new_tags, &existing.tags);
            self.adjust_logged(&removed, user_id, CountDelta::Decrement, "update");
            self.adjust_logged(&added, user_id, CountDelta::Increment, "update");
        }

        let updated = self
            .snippets
            .update_by_id(snippet_id, &patch)?
            .ok_or(AppError::NotFound)?;
        tracing::info!(snippet_id, user_id, "updated snippet");
        Ok(updated)
    }

    /// Remove a snippet the user owns and release its tag counts.
    ///
    /// # Errors
    /// [`AppError::NotFound`] / [`AppError::Forbidden`] from the ownership
    /// check, or a storage error from the delete.
    pub fn delete(&self, user_id: &str, snippet_id: &str) -> Result<Snippet, AppError> {
        let user_id = require_user_id(user_id)?;
        load_owned_snippet(self.snippets.as_ref(), user_id, snippet_id)?;

        let removed = self
            .snippets
            .delete_by_id(snippet_id)?
            .ok_or(AppError::NotFound)?;
        tracing::info!(snippet_id, user_id, "deleted snippet");
        self.adjust_logged(&removed.tags, user_id, CountDelta::Decrement, "delete");
        Ok(removed)
    }
}

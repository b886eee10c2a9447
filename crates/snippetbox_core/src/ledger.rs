//! Tag count ledger: keeps `Tag::snippet_count` in step with snippet tag lists.

use crate::error::AppError;
use crate::store::{CountUpdate, SnippetStore, TagStore};
use crate::text::dedup_preserving_order;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A single-step counter change. Larger deltas are not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountDelta {
    Increment,
    Decrement,
}

impl CountDelta {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Increment => 1,
            Self::Decrement => -1,
        }
    }
}

/// Per-call summary of an [`TagLedger::adjust`] batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjustReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
    pub clamped: Vec<String>,
}

/// Result of a full recount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub tags_checked: usize,
    pub tags_repaired: usize,
}

/// Applies tag count deltas on behalf of snippet mutations.
pub struct TagLedger<T> {
    tags: Arc<T>,
}

impl<T> Clone for TagLedger<T> {
    fn clone(&self) -> Self {
        Self {
            tags: Arc::clone(&self.tags),
        }
    }
}

impl<T: TagStore> TagLedger<T> {
    pub fn new(tags: Arc<T>) -> Self {
        Self { tags }
    }

    /// Apply `delta` once to every distinct tag id in `tag_ids`, scoped to `user_id`.
    ///
    /// Unknown ids (or ids owned by someone else) are skipped. Every id is
    /// attempted even after a storage failure; the first failure is returned
    /// once the batch finishes.
    ///
    /// # Errors
    /// Returns the first storage error encountered.
    pub fn adjust(
        &self,
        tag_ids: &[String],
        user_id: &str,
        delta: CountDelta,
    ) -> Result<AdjustReport, AppError> {
        let mut report = AdjustReport::default();
        let mut first_error = None;
        for tag_id in dedup_preserving_order(tag_ids) {
            match self.tags.increment_count(&tag_id, user_id, delta.as_i64()) {
                Ok(CountUpdate::Applied(_)) => report.applied.push(tag_id),
                Ok(CountUpdate::Missing) => {
                    tracing::debug!(
                        tag_id = tag_id.as_str(),
                        user_id,
                        "skipping count adjustment for unknown tag"
                    );
                    report.skipped.push(tag_id);
                }
                Ok(CountUpdate::Clamped) => {
                    tracing::warn!(
                        tag_id = tag_id.as_str(),
                        user_id,
                        "tag count decrement clamped at zero"
                    );
                    report.clamped.push(tag_id);
                }
                Err(err) => {
                    tracing::error!(
                        tag_id = tag_id.as_str(),
                        user_id,
                        "tag count adjustment failed: {}",
                        err
                    );
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }

    /// Recompute every tag's count from the snippets that reference it.
    ///
    /// `owner_id` limits the pass to one user. A snippet listing the same tag
    /// twice counts once.
    ///
    /// # Errors
    /// Returns a storage error from either store.
    pub fn reconcile<S: SnippetStore + ?Sized>(
        &self,
        snippets: &S,
        owner_id: Option<&str>,
    ) -> Result<ReconcileReport, AppError> {
        let mut references: HashMap<(String, String), u64> = HashMap::new();
        snippets.scan(owner_id, &mut |snippet| {
            let distinct: HashSet<&str> = snippet.tags.iter().map(String::as_str).collect();
            for tag_id in distinct {
                *references
                    .entry((snippet.user_id.clone(), tag_id.to_string()))
                    .or_insert(0) += 1;
            }
            Ok(())
        })?;

        let mut report = ReconcileReport::default();
        for tag in self.tags.list(owner_id)? {
            report.tags_checked += 1;
            let expected = references
                .get(&(tag.user_id.clone(), tag.id.clone()))
                .copied()
                .unwrap_or(0);
            if tag.snippet_count != expected {
                tracing::warn!(
                    tag_id = tag.id.as_str(),
                    stored = tag.snippet_count,
                    expected,
                    "repairing drifted tag count"
                );
                if self.tags.set_count(&tag.id, &tag.user_id, expected)? {
                    report.tags_repaired += 1;
                }
            }
        }
        Ok(report)
    }
}

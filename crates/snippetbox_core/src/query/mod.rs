//! Snippet query engine: filter, sort, and paginate a user's snippets.

mod filter;

pub use self::filter::{
    Pagination, SnippetFilter, SnippetQuery, SnippetSort, SortDirection, SortField,
};

use crate::error::AppError;
use crate::models::{ProgrammingLanguage, Snippet};
use crate::store::{load_owned_snippet, require_user_id, SnippetStore};
use serde::Serialize;
use std::sync::Arc;

/// Optional filter inputs for [`SnippetQueryEngine::list_snippets`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetFilters {
    pub search: Option<String>,
    pub language: Option<ProgrammingLanguage>,
    pub tag: Option<String>,
}

/// One page of snippets plus totals over the filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetPage {
    pub items: Vec<Snippet>,
    pub total_count: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Read-only snippet queries scoped to the requesting user.
pub struct SnippetQueryEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for SnippetQueryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SnippetStore> SnippetQueryEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Build the query plan for a listing without executing it.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when `user_id` is blank.
    pub fn plan(
        user_id: &str,
        filters: &SnippetFilters,
        pagination: Pagination,
        sort: SnippetSort,
    ) -> Result<SnippetQuery, AppError> {
        let user_id = require_user_id(user_id)?;
        let filter = SnippetFilter::for_owner(user_id)
            .with_search(filters.search.as_deref())
            .with_language(filters.language)
            .with_tag(filters.tag.as_deref());
        Ok(SnippetQuery {
            filter,
            sort,
            skip: pagination.skip(),
            limit: pagination.limit(),
        })
    }

    /// List the user's snippets matching every active filter.
    ///
    /// `total_count` covers the filtered set; a page past the end yields an
    /// empty `items` with the same totals.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a blank `user_id`, or a storage error.
    pub fn list_snippets(
        &self,
        user_id: &str,
        filters: &SnippetFilters,
        pagination: Pagination,
        sort: SnippetSort,
    ) -> Result<SnippetPage, AppError> {
        let query = Self::plan(user_id, filters, pagination, sort)?;
        let (items, total_count) = self.store.find_page(&query)?;
        Ok(SnippetPage {
            items,
            total_count,
            page: pagination.page(),
            limit: pagination.limit(),
            total_pages: pagination.total_pages(total_count),
        })
    }

    /// Fetch one snippet the user owns.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when missing, [`AppError::Forbidden`] for another
    /// user's snippet.
    pub fn get_snippet(&self, user_id: &str, snippet_id: &str) -> Result<Snippet, AppError> {
        let user_id = require_user_id(user_id)?;
        load_owned_snippet(self.store.as_ref(), user_id, snippet_id)
    }

    /// Public snippets of `owner_id`, newest first.
    pub fn list_public_snippets(&self, owner_id: &str) -> Result<Vec<Snippet>, AppError> {
        let owner_id = require_user_id(owner_id)?;
        let query = SnippetQuery {
            filter: SnippetFilter::for_owner(owner_id).public_only(),
            sort: SnippetSort::default(),
            skip: 0,
            limit: usize::MAX,
        };
        self.store.find_many(&query)
    }
}

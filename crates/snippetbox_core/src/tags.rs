//! User-scoped tag CRUD.

use crate::error::AppError;
use crate::models::{Tag, TagPatch};
use crate::store::{load_owned_tag, require_user_id, TagStore};
use std::sync::Arc;

/// Tag operations confined to the requesting user's tags.
pub struct TagCatalog<T> {
    tags: Arc<T>,
}

impl<T> Clone for TagCatalog<T> {
    fn clone(&self) -> Self {
        Self {
            tags: Arc::clone(&self.tags),
        }
    }
}

impl<T: TagStore> TagCatalog<T> {
    pub fn new(tags: Arc<T>) -> Self {
        Self { tags }
    }

    /// Persist a validated tag. The owner is taken from `tag.user_id`.
    ///
    /// # Errors
    /// [`AppError::Conflict`] when the owner already has a tag with that name.
    pub fn create(&self, tag: Tag) -> Result<Tag, AppError> {
        require_user_id(&tag.user_id)?;
        self.tags.insert(&tag)?;
        tracing::info!(
            tag_id = tag.id.as_str(),
            user_id = tag.user_id.as_str(),
            "created tag"
        );
        Ok(tag)
    }

    /// All of the user's tags, sorted by name.
    pub fn list(&self, user_id: &str) -> Result<Vec<Tag>, AppError> {
        let user_id = require_user_id(user_id)?;
        self.tags.list(Some(user_id))
    }

    pub fn get(&self, user_id: &str, tag_id: &str) -> Result<Tag, AppError> {
        let user_id = require_user_id(user_id)?;
        load_owned_tag(self.tags.as_ref(), user_id, tag_id)
    }

    /// Rename or recolor a tag the user owns. The count is left as is.
    ///
    /// # Errors
    /// [`AppError::NotFound`], [`AppError::Forbidden`], or
    /// [`AppError::Conflict`] on a name clash.
    pub fn update(&self, user_id: &str, tag_id: &str, patch: TagPatch) -> Result<Tag, AppError> {
        let user_id = require_user_id(user_id)?;
        load_owned_tag(self.tags.as_ref(), user_id, tag_id)?;
        self.tags
            .update_by_id(tag_id, &patch)?
            .ok_or(AppError::NotFound)
    }

    /// Delete a tag the user owns.
    ///
    /// Snippets keep the now-dangling id in their tag lists; later count
    /// adjustments skip it.
    pub fn delete(&self, user_id: &str, tag_id: &str) -> Result<Tag, AppError> {
        let user_id = require_user_id(user_id)?;
        load_owned_tag(self.tags.as_ref(), user_id, tag_id)?;
        let removed = self
            .tags
            .delete_by_id(tag_id)?
            .ok_or(AppError::NotFound)?;
        tracing::info!(tag_id, user_id, "deleted tag");
        Ok(removed)
    }
}

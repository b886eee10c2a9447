//! Snippet storage operations backed by redb.

use crate::db::tables::{SNIPPETS, SNIPPETS_BY_OWNER};
use crate::error::AppError;
use crate::models::{Snippet, SnippetPatch};
use crate::query::{SnippetFilter, SnippetQuery};
use crate::store::SnippetStore;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

pub(crate) fn deserialize_snippet(bytes: &[u8]) -> Result<Snippet, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Accessor for snippet-related redb tables.
pub struct SnippetDb {
    db: Arc<redb::Database>,
}

impl SnippetDb {
    /// Initialize snippet tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(SNIPPETS)?;
        write_txn.open_table(SNIPPETS_BY_OWNER)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Walk one owner's snippets through the owner index.
    fn for_each_owned<F>(&self, owner_id: &str, mut on_snippet: F) -> Result<(), AppError>
    where
        F: FnMut(Snippet) -> Result<(), AppError>,
    {
        let read_txn = self.db.begin_read()?;
        let by_owner = read_txn.open_table(SNIPPETS_BY_OWNER)?;
        let snippets = read_txn.open_table(SNIPPETS)?;
        for item in by_owner.range((owner_id, "")..)? {
            let (key, _) = item?;
            let (row_owner, snippet_id) = key.value();
            if row_owner != owner_id {
                break;
            }
            let Some(guard) = snippets.get(snippet_id)? else {
                tracing::warn!(
                    snippet_id,
                    owner_id,
                    "owner index references a missing snippet row"
                );
                continue;
            };
            on_snippet(deserialize_snippet(guard.value())?)?;
        }
        Ok(())
    }
}

impl SnippetStore for SnippetDb {
    fn find_many(&self, query: &SnippetQuery) -> Result<Vec<Snippet>, AppError> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }
        let mut candidates = Vec::new();
        self.for_each_owned(query.filter.owner_id(), |snippet| {
            if query.filter.matches(&snippet) {
                candidates.push(snippet);
            }
            Ok(())
        })?;
        Ok(query.paginate(candidates))
    }

    fn count(&self, filter: &SnippetFilter) -> Result<usize, AppError> {
        let mut total = 0usize;
        self.for_each_owned(filter.owner_id(), |snippet| {
            if filter.matches(&snippet) {
                total += 1;
            }
            Ok(())
        })?;
        Ok(total)
    }

    fn find_page(&self, query: &SnippetQuery) -> Result<(Vec<Snippet>, usize), AppError> {
        let mut candidates = Vec::new();
        self.for_each_owned(query.filter.owner_id(), |snippet| {
            if query.filter.matches(&snippet) {
                candidates.push(snippet);
            }
            Ok(())
        })?;
        let total_count = candidates.len();
        Ok((query.paginate(candidates), total_count))
    }

    fn find_one(&self, id: &str) -> Result<Option<Snippet>, AppError> {
        let read_txn = self.db.begin_read()?;
        let snippets = read_txn.open_table(SNIPPETS)?;
        match snippets.get(id)? {
            Some(value) => Ok(Some(deserialize_snippet(value.value())?)),
            None => Ok(None),
        }
    }

    fn insert(&self, snippet: &Snippet) -> Result<(), AppError> {
        let encoded = bincode::serialize(snippet)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut snippets = write_txn.open_table(SNIPPETS)?;
            let mut by_owner = write_txn.open_table(SNIPPETS_BY_OWNER)?;

            if snippets.get(snippet.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Snippet id '{}' already exists",
                    snippet.id
                )));
            }

            snippets.insert(snippet.id.as_str(), encoded.as_slice())?;
            by_owner.insert((snippet.user_id.as_str(), snippet.id.as_str()), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn update_by_id(&self, id: &str, patch: &SnippetPatch) -> Result<Option<Snippet>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut snippets = write_txn.open_table(SNIPPETS)?;
            let Some(old_guard) = snippets.get(id)? else {
                return Ok(None);
            };
            let mut snippet = deserialize_snippet(old_guard.value())?;
            drop(old_guard);

            snippet.apply_patch(patch);
            let encoded = bincode::serialize(&snippet)?;
            snippets.insert(id, encoded.as_slice())?;
            Some(snippet)
        };
        write_txn.commit()?;
        Ok(updated)
    }

    fn delete_by_id(&self, id: &str) -> Result<Option<Snippet>, AppError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut snippets = write_txn.open_table(SNIPPETS)?;
            let mut by_owner = write_txn.open_table(SNIPPETS_BY_OWNER)?;
            let Some(old_guard) = snippets.get(id)? else {
                return Ok(None);
            };
            let snippet = deserialize_snippet(old_guard.value())?;
            drop(old_guard);

            let _ = by_owner.remove((snippet.user_id.as_str(), id))?;
            let _ = snippets.remove(id)?;
            Some(snippet)
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    fn scan(
        &self,
        owner_id: Option<&str>,
        on_snippet: &mut dyn FnMut(&Snippet) -> Result<(), AppError>,
    ) -> Result<(), AppError> {
        if let Some(owner_id) = owner_id {
            return self.for_each_owned(owner_id, |snippet| on_snippet(&snippet));
        }
        let read_txn = self.db.begin_read()?;
        let snippets = read_txn.open_table(SNIPPETS)?;
        for item in snippets.iter()? {
            let (_, value) = item?;
            on_snippet(&deserialize_snippet(value.value())?)?;
        }
        Ok(())
    }
}

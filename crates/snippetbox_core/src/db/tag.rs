//! Tag storage operations backed by redb.

use crate::db::tables::{TAGS, TAGS_BY_OWNER_NAME};
use crate::error::AppError;
use crate::models::{Tag, TagPatch};
use crate::store::{CountUpdate, TagStore};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

fn deserialize_tag(bytes: &[u8]) -> Result<Tag, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

fn duplicate_name(name: &str) -> AppError {
    AppError::Conflict(format!("Tag with name '{}' already exists", name))
}

fn sort_by_name(tags: &mut [Tag]) {
    tags.sort_by(|a, b| {
        Tag::name_key(&a.name)
            .cmp(&Tag::name_key(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Accessor for tag-related redb tables.
pub struct TagDb {
    db: Arc<redb::Database>,
}

impl TagDb {
    /// Initialize tag tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(TAGS)?;
        write_txn.open_table(TAGS_BY_OWNER_NAME)?;
        write_txn.commit()?;
        Ok(Self { db })
    }
}

impl TagStore for TagDb {
    fn insert(&self, tag: &Tag) -> Result<(), AppError> {
        let encoded = bincode::serialize(tag)?;
        let name_key = Tag::name_key(&tag.name);
        let write_txn = self.db.begin_write()?;
        {
            let mut tags = write_txn.open_table(TAGS)?;
            let mut by_name = write_txn.open_table(TAGS_BY_OWNER_NAME)?;

            if by_name
                .get((tag.user_id.as_str(), name_key.as_str()))?
                .is_some()
            {
                return Err(duplicate_name(&tag.name));
            }
            if tags.get(tag.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Tag id '{}' already exists",
                    tag.id
                )));
            }

            tags.insert(tag.id.as_str(), encoded.as_slice())?;
            by_name.insert(
                (tag.user_id.as_str(), name_key.as_str()),
                tag.id.as_str(),
            )?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn find_one(&self, id: &str) -> Result<Option<Tag>, AppError> {
        let read_txn = self.db.begin_read()?;
        let tags = read_txn.open_table(TAGS)?;
        match tags.get(id)? {
            Some(value) => Ok(Some(deserialize_tag(value.value())?)),
            None => Ok(None),
        }
    }

    fn list(&self, owner_id: Option<&str>) -> Result<Vec<Tag>, AppError> {
        let read_txn = self.db.begin_read()?;
        let tags = read_txn.open_table(TAGS)?;
        let mut out = Vec::new();
        match owner_id {
            Some(owner_id) => {
                let by_name = read_txn.open_table(TAGS_BY_OWNER_NAME)?;
                for item in by_name.range((owner_id, "")..)? {
                    let (key, value) = item?;
                    let (row_owner, _) = key.value();
                    if row_owner != owner_id {
                        break;
                    }
                    if let Some(guard) = tags.get(value.value())? {
                        out.push(deserialize_tag(guard.value())?);
                    }
                }
            }
            None => {
                for item in tags.iter()? {
                    let (_, value) = item?;
                    out.push(deserialize_tag(value.value())?);
                }
            }
        }
        sort_by_name(&mut out);
        Ok(out)
    }

    fn update_by_id(&self, id: &str, patch: &TagPatch) -> Result<Option<Tag>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut tags = write_txn.open_table(TAGS)?;
            let mut by_name = write_txn.open_table(TAGS_BY_OWNER_NAME)?;
            let Some(old_guard) = tags.get(id)? else {
                return Ok(None);
            };
            let mut tag = deserialize_tag(old_guard.value())?;
            drop(old_guard);

            if let Some(name) = &patch.name {
                let old_key = Tag::name_key(&tag.name);
                let new_key = Tag::name_key(name);
                if old_key != new_key {
                    if by_name
                        .get((tag.user_id.as_str(), new_key.as_str()))?
                        .is_some()
                    {
                        return Err(duplicate_name(name));
                    }
                    let _ = by_name.remove((tag.user_id.as_str(), old_key.as_str()))?;
                    by_name.insert((tag.user_id.as_str(), new_key.as_str()), id)?;
                }
                tag.name = name.clone();
            }
            if let Some(color) = &patch.color {
                tag.color = color.clone();
            }

            let encoded = bincode::serialize(&tag)?;
            tags.insert(id, encoded.as_slice())?;
            Some(tag)
        };
        write_txn.commit()?;
        Ok(updated)
    }

    fn delete_by_id(&self, id: &str) -> Result<Option<Tag>, AppError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut tags = write_txn.open_table(TAGS)?;
            let mut by_name = write_txn.open_table(TAGS_BY_OWNER_NAME)?;
            let Some(old_guard) = tags.get(id)? else {
                return Ok(None);
            };
            let tag = deserialize_tag(old_guard.value())?;
            drop(old_guard);

            let name_key = Tag::name_key(&tag.name);
            let _ = by_name.remove((tag.user_id.as_str(), name_key.as_str()))?;
            let _ = tags.remove(id)?;
            Some(tag)
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    fn increment_count(
        &self,
        id: &str,
        owner_id: &str,
        delta: i64,
    ) -> Result<CountUpdate, AppError> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut tags = write_txn.open_table(TAGS)?;
            let Some(old_guard) = tags.get(id)? else {
                return Ok(CountUpdate::Missing);
            };
            let mut tag = deserialize_tag(old_guard.value())?;
            drop(old_guard);
            if tag.user_id != owner_id {
                return Ok(CountUpdate::Missing);
            }

            let magnitude = delta.unsigned_abs();
            let outcome = if delta >= 0 {
                tag.snippet_count = tag.snippet_count.saturating_add(magnitude);
                CountUpdate::Applied(tag.snippet_count)
            } else if tag.snippet_count >= magnitude {
                tag.snippet_count -= magnitude;
                CountUpdate::Applied(tag.snippet_count)
            } else {
                tag.snippet_count = 0;
                CountUpdate::Clamped
            };

            let encoded = bincode::serialize(&tag)?;
            tags.insert(id, encoded.as_slice())?;
            outcome
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    fn set_count(&self, id: &str, owner_id: &str, count: u64) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut tags = write_txn.open_table(TAGS)?;
            let Some(old_guard) = tags.get(id)? else {
                return Ok(false);
            };
            let mut tag = deserialize_tag(old_guard.value())?;
            drop(old_guard);
            if tag.user_id != owner_id {
                return Ok(false);
            }
            tag.snippet_count = count;
            let encoded = bincode::serialize(&tag)?;
            tags.insert(id, encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(true)
    }
}

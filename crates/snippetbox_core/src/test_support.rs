//! Shared test-only helpers for snippetbox_core.

use crate::error::AppError;
use crate::models::{NewSnippet, ProgrammingLanguage, Snippet, SnippetPatch, Tag, TagPatch};
use crate::query::{SnippetFilter, SnippetQuery};
use crate::store::{CountUpdate, SnippetStore, TagStore};
use crate::Database;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// Minimal valid snippet fields with the given title and tags.
pub(crate) fn new_snippet(title: &str, tags: &[&str]) -> NewSnippet {
    NewSnippet {
        title: title.to_string(),
        description: format!("{title} description"),
        code: "fn main() {}".to_string(),
        programming_language: ProgrammingLanguage::Rust,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        is_public: true,
    }
}

/// Asserts every tag's `snippet_count` equals the number of its owner's
/// snippets that reference it.
///
/// # Panics
/// Panics when scanning fails or when any count has drifted.
pub(crate) fn assert_tag_counts_match_snippets(db: &Database) {
    let mut references: HashMap<(String, String), u64> = HashMap::new();
    db.snippets
        .scan(None, &mut |snippet| {
            let distinct: HashSet<&String> = snippet.tags.iter().collect();
            for tag_id in distinct {
                *references
                    .entry((snippet.user_id.clone(), tag_id.clone()))
                    .or_insert(0) += 1;
            }
            Ok(())
        })
        .expect("scan snippets");

    for tag in db.tags.list(None).expect("list tags") {
        let expected = references
            .get(&(tag.user_id.clone(), tag.id.clone()))
            .copied()
            .unwrap_or(0);
        assert_eq!(
            tag.snippet_count, expected,
            "tag count drift for tag {} ({})",
            tag.id, tag.name
        );
    }
}

/// In-memory snippet store used to exercise services without redb.
#[derive(Default)]
pub(crate) struct MemorySnippetStore {
    rows: Mutex<Vec<Snippet>>,
    fail_writes: AtomicBool,
}

impl MemorySnippetStore {
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::StorageMessage("injected snippet write failure".to_string()));
        }
        Ok(())
    }
}

impl SnippetStore for MemorySnippetStore {
    fn find_many(&self, query: &SnippetQuery) -> Result<Vec<Snippet>, AppError> {
        let rows = self.rows.lock().expect("rows lock");
        let matching = rows
            .iter()
            .filter(|snippet| query.filter.matches(snippet))
            .cloned()
            .collect();
        Ok(query.paginate(matching))
    }

    fn count(&self, filter: &SnippetFilter) -> Result<usize, AppError> {
        let rows = self.rows.lock().expect("rows lock");
        Ok(rows.iter().filter(|snippet| filter.matches(snippet)).count())
    }

    fn find_one(&self, id: &str) -> Result<Option<Snippet>, AppError> {
        let rows = self.rows.lock().expect("rows lock");
        Ok(rows.iter().find(|snippet| snippet.id == id).cloned())
    }

    fn insert(&self, snippet: &Snippet) -> Result<(), AppError> {
        self.check_write()?;
        self.rows.lock().expect("rows lock").push(snippet.clone());
        Ok(())
    }

    fn update_by_id(&self, id: &str, patch: &SnippetPatch) -> Result<Option<Snippet>, AppError> {
        self.check_write()?;
        let mut rows = self.rows.lock().expect("rows lock");
        Ok(rows.iter_mut().find(|snippet| snippet.id == id).map(|snippet| {
            snippet.apply_patch(patch);
            snippet.clone()
        }))
    }

    fn delete_by_id(&self, id: &str) -> Result<Option<Snippet>, AppError> {
        self.check_write()?;
        let mut rows = self.rows.lock().expect("rows lock");
        let position = rows.iter().position(|snippet| snippet.id == id);
        Ok(position.map(|index| rows.remove(index)))
    }

    fn scan(
        &self,
        owner_id: Option<&str>,
        on_snippet: &mut dyn FnMut(&Snippet) -> Result<(), AppError>,
    ) -> Result<(), AppError> {
        let rows = self.rows.lock().expect("rows lock");
        for snippet in rows.iter() {
            if owner_id.is_some_and(|owner| owner != snippet.user_id) {
                continue;
            }
            on_snippet(snippet)?;
        }
        Ok(())
    }
}

/// In-memory tag store whose counter updates can be made to fail.
#[derive(Default)]
pub(crate) struct MemoryTagStore {
    rows: Mutex<Vec<Tag>>,
    fail_counts: AtomicBool,
    fail_ids: Mutex<HashSet<String>>,
}

impl MemoryTagStore {
    pub(crate) fn fail_counts(&self, fail: bool) {
        self.fail_counts.store(fail, Ordering::SeqCst);
    }

    /// Make counter updates for this one tag id fail.
    pub(crate) fn fail_count_for(&self, id: &str) {
        self.fail_ids
            .lock()
            .expect("fail ids lock")
            .insert(id.to_string());
    }

    pub(crate) fn count_of(&self, id: &str) -> u64 {
        self.rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|tag| tag.id == id)
            .map(|tag| tag.snippet_count)
            .unwrap_or(0)
    }
}

impl TagStore for MemoryTagStore {
    fn insert(&self, tag: &Tag) -> Result<(), AppError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let key = Tag::name_key(&tag.name);
        if rows
            .iter()
            .any(|row| row.user_id == tag.user_id && Tag::name_key(&row.name) == key)
        {
            return Err(AppError::Conflict(format!(
                "Tag with name '{}' already exists",
                tag.name
            )));
        }
        rows.push(tag.clone());
        Ok(())
    }

    fn find_one(&self, id: &str) -> Result<Option<Tag>, AppError> {
        let rows = self.rows.lock().expect("rows lock");
        Ok(rows.iter().find(|tag| tag.id == id).cloned())
    }

    fn list(&self, owner_id: Option<&str>) -> Result<Vec<Tag>, AppError> {
        let rows = self.rows.lock().expect("rows lock");
        let mut tags: Vec<Tag> = rows
            .iter()
            .filter(|tag| owner_id.map_or(true, |owner| owner == tag.user_id))
            .cloned()
            .collect();
        tags.sort_by_key(|tag| Tag::name_key(&tag.name));
        Ok(tags)
    }

    fn update_by_id(&self, id: &str, patch: &TagPatch) -> Result<Option<Tag>, AppError> {
        let mut rows = self.rows.lock().expect("rows lock");
        Ok(rows.iter_mut().find(|tag| tag.id == id).map(|tag| {
            if let Some(name) = &patch.name {
                tag.name = name.clone();
            }
            if let Some(color) = &patch.color {
                tag.color = color.clone();
            }
            tag.clone()
        }))
    }

    fn delete_by_id(&self, id: &str) -> Result<Option<Tag>, AppError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let position = rows.iter().position(|tag| tag.id == id);
        Ok(position.map(|index| rows.remove(index)))
    }

    fn increment_count(
        &self,
        id: &str,
        owner_id: &str,
        delta: i64,
    ) -> Result<CountUpdate, AppError> {
        if self.fail_counts.load(Ordering::SeqCst)
            || self.fail_ids.lock().expect("fail ids lock").contains(id)
        {
            return Err(AppError::StorageMessage("injected count failure".to_string()));
        }
        let mut rows = self.rows.lock().expect("rows lock");
        let Some(tag) = rows
            .iter_mut()
            .find(|tag| tag.id == id && tag.user_id == owner_id)
        else {
            return Ok(CountUpdate::Missing);
        };
        let next = tag.snippet_count as i64 + delta;
        if next < 0 {
            tag.snippet_count = 0;
            return Ok(CountUpdate::Clamped);
        }
        tag.snippet_count = next as u64;
        Ok(CountUpdate::Applied(tag.snippet_count))
    }

    fn set_count(&self, id: &str, owner_id: &str, count: u64) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().expect("rows lock");
        match rows
            .iter_mut()
            .find(|tag| tag.id == id && tag.user_id == owner_id)
        {
            Some(tag) => {
                tag.snippet_count = count;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

//! Database layer for SnippetBox backed by redb.

/// Snippet storage.
pub mod snippet;
/// redb table definitions.
pub mod tables;
/// Tag storage.
pub mod tag;

pub use self::snippet::SnippetDb;
pub use self::tag::TagDb;

use crate::error::AppError;
use crate::ledger::{ReconcileReport, TagLedger};
use crate::lifecycle::SnippetLifecycle;
use crate::query::SnippetQueryEngine;
use crate::tags::TagCatalog;
use std::path::Path;
use std::sync::Arc;

/// Database handle with typed accessors for snippets and tags.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub snippets: Arc<SnippetDb>,
    pub tags: Arc<TagDb>,
}

impl Database {
    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be opened.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            snippets: Arc::new(SnippetDb::new(db.clone())?),
            tags: Arc::new(TagDb::new(db.clone())?),
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }

    /// Open (or create) the database under the `path` directory.
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created, another process
    /// holds the database open, or table initialization fails.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let file = dir.join(tables::REDB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "Database at '{}' is already open in another process.\n\
                    Stop the other SnippetBox instance, or set DB_PATH to use a different location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };

        tracing::debug!(path = %file.display(), "opened snippet database");
        Self::from_shared(db)
    }

    /// Read-side snippet queries over this database.
    pub fn query_engine(&self) -> SnippetQueryEngine<SnippetDb> {
        SnippetQueryEngine::new(self.snippets.clone())
    }

    /// Tag count ledger over this database.
    pub fn ledger(&self) -> TagLedger<TagDb> {
        TagLedger::new(self.tags.clone())
    }

    /// Snippet mutation orchestration over this database.
    pub fn lifecycle(&self) -> SnippetLifecycle<SnippetDb, TagDb> {
        SnippetLifecycle::new(self.snippets.clone(), self.ledger())
    }

    /// Tag CRUD over this database.
    pub fn tag_catalog(&self) -> TagCatalog<TagDb> {
        TagCatalog::new(self.tags.clone())
    }

    /// Recompute every tag's snippet count from the stored snippets.
    ///
    /// # Errors
    /// Returns a storage error when scanning or writing fails.
    pub fn reconcile_tag_counts(&self) -> Result<ReconcileReport, AppError> {
        self.ledger().reconcile(self.snippets.as_ref(), None)
    }
}

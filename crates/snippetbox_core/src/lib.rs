//! Core domain library for SnippetBox (config, storage, models, snippet services).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Database access layer backed by redb.
pub mod db;
/// Process-global environment mutation helpers.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Tag count bookkeeping.
pub mod ledger;
/// Snippet create/update/delete orchestration.
pub mod lifecycle;
/// Data models for API requests and persistence.
pub mod models;
/// Snippet filtering, sorting, and pagination.
pub mod query;
/// Persistence collaborator traits.
pub mod store;
/// User-scoped tag CRUD.
pub mod tags;
/// Shared text normalization helpers.
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::DEFAULT_PORT;
pub use db::Database;
pub use error::AppError;
pub use ledger::{CountDelta, TagLedger};
pub use lifecycle::SnippetLifecycle;
pub use query::{SnippetPage, SnippetQueryEngine};
pub use store::{SnippetStore, TagStore};
pub use tags::TagCatalog;

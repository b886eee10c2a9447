//! Data models shared by storage, services, and the HTTP layer.

/// Supported programming languages.
pub mod language;
/// Snippet models.
pub mod snippet;
/// Tag models.
pub mod tag;
/// Explicit payload validation.
pub mod validation;

pub use language::ProgrammingLanguage;
pub use snippet::{
    CreateSnippetRequest, ListSnippetsQuery, NewSnippet, Snippet, SnippetPatch,
    UpdateSnippetRequest,
};
pub use tag::{CreateTagRequest, Tag, TagPatch, UpdateTagRequest};

//! HTTP request handlers.

/// Snippet endpoints.
pub mod snippet;
/// Tag endpoints.
pub mod tag;

//! Root crate facade for the SnippetBox core library and HTTP server.

pub use snippetbox_core::{
    config, constants, db, ledger, lifecycle, models, query, store, tags, AppError, Config,
    Database, SnippetLifecycle, SnippetPage, SnippetQueryEngine, TagCatalog, TagLedger,
};
pub use snippetbox_server::{
    auth, create_app, error, handlers, resolve_bind_address, serve_router, AppState, AuthUser,
    HttpError,
};

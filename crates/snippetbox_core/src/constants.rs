//! Shared constants used across SnippetBox crates.

/// Default API port for SnippetBox.
pub const DEFAULT_PORT: u16 = 38480;

/// Default maximum snippet code size accepted by the API layer.
pub const DEFAULT_MAX_SNIPPET_SIZE: usize = 1024 * 1024;

/// Page size used when a list request omits `limit`.
pub const DEFAULT_PAGE_LIMIT: usize = 10;
/// Upper bound applied to caller-supplied page sizes.
pub const DEFAULT_MAX_PAGE_LIMIT: usize = 100;

/// Maximum snippet title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;
/// Maximum snippet description length in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Maximum tag name length in characters.
pub const MAX_TAG_NAME_CHARS: usize = 50;
/// Maximum tag color length (`#rrggbb`).
pub const MAX_TAG_COLOR_CHARS: usize = 7;

/// Header carrying the upstream-authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

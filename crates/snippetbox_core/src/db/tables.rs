//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical snippet rows (`Snippet`, bincode-encoded).
pub const SNIPPETS: TableDefinition<&str, &[u8]> = TableDefinition::new("snippets");
/// Owner index keyed by `(user_id, snippet_id)`.
pub const SNIPPETS_BY_OWNER: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("snippets_by_owner");

/// Canonical tag rows (`Tag`, bincode-encoded).
pub const TAGS: TableDefinition<&str, &[u8]> = TableDefinition::new("tags");
/// Per-owner name uniqueness index: `(user_id, lowercase name)` to tag id.
pub const TAGS_BY_OWNER_NAME: TableDefinition<(&str, &str), &str> =
    TableDefinition::new("tags_by_owner_name");

//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_MAX_PAGE_LIMIT, DEFAULT_MAX_SNIPPET_SIZE, DEFAULT_PAGE_LIMIT, DEFAULT_PORT,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for SnippetBox.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_snippet_size: usize,
    pub default_page_limit: usize,
    pub max_page_limit: usize,
    pub reconcile_on_startup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            port: DEFAULT_PORT,
            max_snippet_size: DEFAULT_MAX_SNIPPET_SIZE,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: DEFAULT_MAX_PAGE_LIMIT,
            reconcile_on_startup: false,
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_db_path() -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("snippetbox")
        .join("db")
        .to_string_lossy()
        .to_string()
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let default_page_limit = env_parsed::<usize>("DEFAULT_PAGE_LIMIT")
            .filter(|limit| *limit > 0)
            .unwrap_or(defaults.default_page_limit);
        let max_page_limit = env_parsed::<usize>("MAX_PAGE_LIMIT")
            .filter(|limit| *limit > 0)
            .unwrap_or(defaults.max_page_limit)
            .max(default_page_limit);
        Self {
            db_path: env::var("DB_PATH")
                .map(expand_tilde)
                .unwrap_or(defaults.db_path),
            port: env_parsed("PORT").unwrap_or(defaults.port),
            max_snippet_size: env_parsed("MAX_SNIPPET_SIZE").unwrap_or(defaults.max_snippet_size),
            default_page_limit,
            max_page_limit,
            reconcile_on_startup: env_flag_enabled("SNIPPETBOX_RECONCILE"),
        }
    }
}

//! Runtime configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve database path, logging settings and default page size.
//! - Keep resolution testable through an injectable key lookup.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - Missing values fall back to documented defaults.

use crate::logging::default_log_level;
use crate::repo::page::{normalize_page_size, PAGE_SIZE_DEFAULT};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TODO_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TODO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TODO_LOG_DIR";
pub const ENV_PAGE_SIZE: &str = "TODO_PAGE_SIZE";

const DEFAULT_DB_FILE_NAME: &str = "todo.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub default_page_size: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_page_size: PAGE_SIZE_DEFAULT,
        }
    }
}

impl CoreConfig {
    /// Resolves settings from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(raw) = read(ENV_PAGE_SIZE) {
            let size = raw.parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
                key: ENV_PAGE_SIZE,
                value: raw.clone(),
            })?;
            config.default_page_size = normalize_page_size(Some(size));
        }
        Ok(config)
    }
}

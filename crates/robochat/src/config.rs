//! Lifecycle configuration.

use std::path::{Path, PathBuf};

use robochat_store::StoreConfig;
use serde::Deserialize;

/// File name used when the host only supplies a directory.
pub const DEFAULT_DB_FILE: &str = "chat.db";

/// Where the store lives and how its engine is tuned.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Path of the store file. Created on first open.
    pub db_path: PathBuf,

    #[serde(default)]
    pub store: StoreConfig,
}

impl ChatConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            store: StoreConfig::default(),
        }
    }

    /// Store file `chat.db` inside `dir`, typically the application's own
    /// directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_DB_FILE))
    }
}

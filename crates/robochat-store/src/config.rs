//! Store configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, StorageError};

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_READ_POOL_SIZE: usize = 4;

/// SQLite `synchronous` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Sync on every commit.
    #[default]
    Full,
    /// Sync at checkpoints only. A power loss may drop the last commits.
    Normal,
}

impl SyncMode {
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Tunables for the SQLite engine.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// How long a connection waits on a lock held by another process.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Number of pooled read connections kept open.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,

    #[serde(default)]
    pub sync_mode: SyncMode,
}

const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

const fn default_read_pool_size() -> usize {
    DEFAULT_READ_POOL_SIZE
}

impl StoreConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.read_pool_size == 0 {
            return Err(StorageError::InvalidConfig(
                "read_pool_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            sync_mode: SyncMode::default(),
        }
    }
}

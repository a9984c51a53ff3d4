//! Error types for the store module.

use robochat_core::CoreError;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Referenced room, message namespace or bucket is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate creation of something that must be unique.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored bytes do not decode to the expected record shape.
    #[error("serialization error: {0}")]
    Serialization(#[from] CoreError),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The bucket tree does not have the expected shape.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Operation issued after the store was closed.
    #[error("store is closed")]
    Closed,
}

impl StorageError {
    /// True for the `NotFound` kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

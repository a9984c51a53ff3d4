//! Error types for Robochat Core.

use thiserror::Error;

/// Errors raised while encoding or decoding stored records and keys.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("could not encode {record}: {source}")]
    Encoding {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored {record} is malformed: {source}")]
    Decoding {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

//! Stored-value codec for chat records.
//!
//! Records are encoded as field-tagged JSON:
//! - Field names are fixed (`chatId`, `title`, `income`, `id`, `author`,
//!   `text`, `userName`)
//! - Non-ASCII and HTML-significant characters are written as-is
//! - No schema version tag inside the value
//!
//! Each call encodes into its own buffer, so concurrent callers share no
//! encoder state. Decoding is strict about shape: a value with a missing
//! field, a wrongly typed field, or trailing bytes is an error, never a
//! partially filled record.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Message, Profile, Room};

/// A record that can be stored as a value in the bucket tree.
pub trait Record: Serialize + DeserializeOwned {
    /// Human-readable record name used in error messages.
    const NAME: &'static str;

    /// Encode to stored bytes.
    fn encode(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(|source| CoreError::Encoding {
            record: Self::NAME,
            source,
        })
    }

    /// Decode from stored bytes.
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(bytes).map_err(|source| CoreError::Decoding {
            record: Self::NAME,
            source,
        })
    }
}

impl Record for Room {
    const NAME: &'static str = "room";
}

impl Record for Message {
    const NAME: &'static str = "message";
}

impl Record for Profile {
    const NAME: &'static str = "profile";
}

//! Strong type definitions for Robochat identifiers.
//!
//! Identifiers are newtypes over `i64` so a chat ID can never be passed
//! where a message ID is expected. Both become namespace keys through their
//! canonical base-10 text form.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Identifier of a chat room. Primary key of the room catalog.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl ChatId {
    /// The namespace key for this room: canonical base-10 text.
    pub fn to_key(self) -> String {
        self.0.to_string()
    }

    /// Parse a stored namespace key back into a chat ID.
    pub fn from_key(key: &[u8]) -> Result<Self, CoreError> {
        parse_key(key).map(Self)
    }
}

impl fmt::Debug for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChatId({})", self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a message. Unique only within its owning room.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl MessageId {
    /// The key of this message inside its room's namespace.
    pub fn to_key(self) -> String {
        self.0.to_string()
    }

    /// Parse a stored message key.
    pub fn from_key(key: &[u8]) -> Result<Self, CoreError> {
        parse_key(key).map(Self)
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

fn parse_key(key: &[u8]) -> Result<i64, CoreError> {
    let text = std::str::from_utf8(key)
        .map_err(|_| CoreError::InvalidKey(String::from_utf8_lossy(key).into_owned()))?;
    let id: i64 = text
        .parse()
        .map_err(|_| CoreError::InvalidKey(text.to_string()))?;
    // "+1" and "01" parse, but are not what `to_key` would have written.
    if id.to_string() != text {
        return Err(CoreError::InvalidKey(text.to_string()));
    }
    Ok(id)
}

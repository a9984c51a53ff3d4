//! Chat records: rooms, messages and the user profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ChatId, MessageId};

/// A chat room as stored in the room catalog.
///
/// Every write replaces the whole record; there are no partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub chat_id: ChatId,
    pub title: String,
    /// Reserved counter. Always zero on creation.
    pub income: i32,
}

impl Room {
    /// Create a fresh room record with `income` zeroed.
    pub fn new(chat_id: ChatId, title: impl Into<String>) -> Self {
        Self {
            chat_id,
            title: title.into(),
            income: 0,
        }
    }
}

/// A message inside a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: String,
    pub text: String,
}

impl Message {
    pub fn new(id: MessageId, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            author: author.into(),
            text: text.into(),
        }
    }
}

/// The singleton user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_name: String,
}

/// Messages of every room, keyed by the room's text key.
///
/// Iteration follows the key bytes, the same order the store enumerates
/// rooms in. `"10"` comes before `"2"`.
pub type ChatMessages = BTreeMap<String, Vec<Message>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_room_has_zero_income() {
        let room = Room::new(ChatId(5), "General");
        assert_eq!(room.income, 0);
        assert_eq!(room.title, "General");
    }

    #[test]
    fn test_profile_default_is_empty() {
        assert_eq!(Profile::default().user_name, "");
    }
}

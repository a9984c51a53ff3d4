//! In-memory implementation of the ChatStore trait.
//!
//! This is primarily for testing code built on [`ChatStore`]. It has the same
//! semantics as SQLite, including encoded records and the closed state, but
//! keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use robochat_core::{ChatId, ChatMessages, Message, MessageId, Profile, Record, Room};

use crate::error::{Result, StorageError};
use crate::traits::ChatStore;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    /// `None` once closed.
    inner: RwLock<Option<MemoryStoreInner>>,
}

/// The bucket tree, with `String` keys standing in for byte keys. `String`
/// orders by bytes, so enumeration matches SQLite.
#[derive(Default)]
struct MemoryStoreInner {
    /// Room records by room key.
    chats: BTreeMap<String, Vec<u8>>,

    /// Message records by room key, then message key.
    messages: BTreeMap<String, BTreeMap<String, Vec<u8>>>,

    /// Encoded profile.
    profile: Option<Vec<u8>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Some(MemoryStoreInner::default())),
        }
    }

    /// Run `f` on the open tree under the read lock.
    fn with_tree<T>(&self, f: impl FnOnce(&MemoryStoreInner) -> Result<T>) -> Result<T> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_ref().ok_or(StorageError::Closed)?)
    }

    /// Run `f` on the open tree under the write lock.
    ///
    /// `f` must check every precondition before its first mutation, so a
    /// failed call leaves the tree unchanged.
    fn with_tree_mut<T>(&self, f: impl FnOnce(&mut MemoryStoreInner) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_mut().ok_or(StorageError::Closed)?)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreInner {
    fn room_mut(&mut self, chat_id: ChatId) -> Result<&mut BTreeMap<String, Vec<u8>>> {
        self.messages
            .get_mut(&chat_id.to_key())
            .ok_or_else(|| StorageError::NotFound(format!("room {}", chat_id)))
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn add_room(&self, chat_id: ChatId, title: &str) -> Result<()> {
        let record = Room::new(chat_id, title).encode()?;
        self.with_tree_mut(|tree| {
            let key = chat_id.to_key();
            if tree.messages.contains_key(&key) {
                return Err(StorageError::Conflict(format!(
                    "room {} already exists",
                    chat_id
                )));
            }
            tree.chats.insert(key.clone(), record);
            tree.messages.insert(key, BTreeMap::new());
            Ok(())
        })
    }

    async fn load_rooms(&self) -> Result<Vec<Room>> {
        self.with_tree(|tree| {
            tree.chats
                .values()
                .map(|bytes| Room::decode(bytes).map_err(StorageError::from))
                .collect()
        })
    }

    async fn delete_chat(&self, chat_id: ChatId) -> Result<()> {
        self.with_tree_mut(|tree| {
            let key = chat_id.to_key();
            if !tree.messages.contains_key(&key) {
                return Err(StorageError::NotFound(format!(
                    "messages of room {}",
                    chat_id
                )));
            }
            if !tree.chats.contains_key(&key) {
                return Err(StorageError::NotFound(format!("room {}", chat_id)));
            }
            tree.messages.remove(&key);
            tree.chats.remove(&key);
            Ok(())
        })
    }

    async fn push_message(&self, chat_id: ChatId, message: &Message) -> Result<()> {
        let record = message.encode()?;
        self.with_tree_mut(|tree| {
            tree.room_mut(chat_id)?.insert(message.id.to_key(), record);
            Ok(())
        })
    }

    async fn load_messages(&self) -> Result<ChatMessages> {
        self.with_tree(|tree| {
            let mut result = ChatMessages::new();
            for (key, room) in &tree.messages {
                let list = room
                    .values()
                    .map(|bytes| Message::decode(bytes).map_err(StorageError::from))
                    .collect::<Result<Vec<_>>>()?;
                result.insert(key.clone(), list);
            }
            Ok(result)
        })
    }

    async fn delete_message(&self, chat_id: ChatId, msg_id: MessageId) -> Result<()> {
        self.with_tree_mut(|tree| {
            tree.room_mut(chat_id)?.remove(&msg_id.to_key());
            Ok(())
        })
    }

    async fn load_profile(&self) -> Result<Profile> {
        self.with_tree(|tree| match &tree.profile {
            Some(bytes) => Ok(Profile::decode(bytes)?),
            None => Ok(Profile::default()),
        })
    }

    async fn set_user_name(&self, user_name: &str) -> Result<()> {
        let record = Profile {
            user_name: user_name.to_string(),
        }
        .encode()?;
        self.with_tree_mut(|tree| {
            tree.profile = Some(record);
            Ok(())
        })
    }

    async fn close(&self) -> Result<()> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

//! The storage facade: the one handle the request-handling layer holds.
//!
//! It is an explicit object built from a [`ChatConfig`] and passed to its
//! consumers; there is no global store.

use std::sync::Arc;

use robochat_core::{ChatId, ChatMessages, Message, MessageId, Profile, Room};
use robochat_store::{ChatStore, Result, SqliteStore, StorageError};
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::seed;

/// Room, message and profile storage behind a [`ChatStore`].
///
/// Cheap to clone; clones share the same store.
pub struct ChatStorage<S: ChatStore = SqliteStore> {
    store: Arc<S>,
}

impl<S: ChatStore> Clone for ChatStorage<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl ChatStorage<SqliteStore> {
    /// Open (creating if needed) the store described by `config`.
    ///
    /// Idempotent on an existing file: the bucket tree is only created where
    /// missing.
    pub fn open(config: &ChatConfig) -> Result<Self> {
        let store = SqliteStore::open_with_config(&config.db_path, &config.store)?;
        info!(path = %config.db_path.display(), "chat storage ready");
        Ok(Self::with_store(store))
    }
}

impl<S: ChatStore> ChatStorage<S> {
    /// Wrap an already-open store.
    pub fn with_store(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rooms
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_room(&self, chat_id: ChatId, title: &str) -> Result<()> {
        self.store.add_room(chat_id, title).await
    }

    pub async fn load_rooms(&self) -> Result<Vec<Room>> {
        self.store.load_rooms().await
    }

    pub async fn delete_chat(&self, chat_id: ChatId) -> Result<()> {
        self.store.delete_chat(chat_id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn push_message(&self, chat_id: ChatId, message: &Message) -> Result<()> {
        self.store.push_message(chat_id, message).await
    }

    pub async fn load_messages(&self) -> Result<ChatMessages> {
        self.store.load_messages().await
    }

    pub async fn delete_message(&self, chat_id: ChatId, msg_id: MessageId) -> Result<()> {
        self.store.delete_message(chat_id, msg_id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Profile
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn load_profile(&self) -> Result<Profile> {
        self.store.load_profile().await
    }

    pub async fn set_user_name(&self, user_name: &str) -> Result<()> {
        self.store.set_user_name(user_name).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Release the store. Every later call fails with `Closed`.
    pub async fn close(&self) -> Result<()> {
        self.store.close().await?;
        info!("chat storage closed");
        Ok(())
    }

    /// Install the startup data from [`seed`]: room 1 with a short greeting
    /// exchange, and user name `User`.
    ///
    /// Safe to run on every start. An existing room 1 is kept, and the two
    /// greeting messages are rewritten in place.
    pub async fn seed_demo(&self) -> Result<()> {
        match self.store.add_room(seed::ROOM_ID, seed::ROOM_TITLE).await {
            Ok(()) => {}
            Err(StorageError::Conflict(_)) => debug!("demo room already present"),
            Err(err) => return Err(err),
        }
        for message in seed::messages() {
            self.store.push_message(seed::ROOM_ID, &message).await?;
        }
        self.store.set_user_name(seed::USER_NAME).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robochat_store::MemoryStore;

    #[tokio::test]
    async fn test_seed_demo_is_repeatable() {
        let storage = ChatStorage::with_store(MemoryStore::new());
        storage.seed_demo().await.unwrap();
        storage.seed_demo().await.unwrap();

        assert_eq!(storage.load_rooms().await.unwrap(), vec![seed::room()]);
        assert_eq!(storage.load_messages().await.unwrap()["1"], seed::messages());
        assert_eq!(storage.load_profile().await.unwrap().user_name, "User");
    }

    #[tokio::test]
    async fn test_seed_demo_keeps_existing_room() {
        let storage = ChatStorage::with_store(MemoryStore::new());
        storage.add_room(ChatId(1), "Renamed").await.unwrap();
        storage
            .push_message(ChatId(1), &Message::new(MessageId(7), "User", "still here"))
            .await
            .unwrap();

        storage.seed_demo().await.unwrap();

        assert_eq!(storage.load_rooms().await.unwrap()[0].title, "Renamed");
        let ids: Vec<i64> = storage.load_messages().await.unwrap()["1"]
            .iter()
            .map(|m| m.id.0)
            .collect();
        assert_eq!(ids, vec![1, 2, 7]);
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let storage = ChatStorage::with_store(MemoryStore::new());
        let other = storage.clone();
        other.set_user_name("Shared").await.unwrap();
        assert_eq!(storage.load_profile().await.unwrap().user_name, "Shared");

        other.close().await.unwrap();
        assert!(matches!(
            storage.load_rooms().await,
            Err(StorageError::Closed)
        ));
    }
}

//! SQLite implementation of the ChatStore trait.
//!
//! This is the primary storage backend. Each operation is one engine
//! transaction run on tokio's blocking pool via `spawn_blocking`. A caller
//! that drops the future does not interrupt the transaction; it runs to
//! commit or rollback on its own.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use robochat_core::{ChatId, ChatMessages, Message, MessageId, Profile, Room};

use crate::config::StoreConfig;
use crate::engine::Engine;
use crate::error::{Result, StorageError};
use crate::traits::ChatStore;
use crate::{messages, profile, rooms, schema};

/// SQLite-based chat store.
///
/// Cheap to clone; clones share one engine.
#[derive(Clone)]
pub struct SqliteStore {
    engine: Arc<Engine>,
}

impl SqliteStore {
    /// Open the store file at `path` with default settings.
    ///
    /// Creates the file, runs migrations and ensures the bucket tree.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &StoreConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        let engine = Engine::open(path, config)?;
        engine.update(schema::ensure)?;
        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// The underlying engine, for composing several operations into one
    /// transaction.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run a blocking operation against the engine on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Engine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| {
                StorageError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                    Some(format!("spawn_blocking failed: {}", e)),
                ))
            })?
    }
}

#[async_trait]
impl ChatStore for SqliteStore {
    async fn add_room(&self, chat_id: ChatId, title: &str) -> Result<()> {
        let title = title.to_string();
        debug!(%chat_id, %title, "adding room");
        self.blocking(move |engine| engine.update(|tx| rooms::add_room(tx, chat_id, &title)))
            .await
    }

    async fn load_rooms(&self) -> Result<Vec<Room>> {
        self.blocking(|engine| engine.view(rooms::load_rooms)).await
    }

    async fn delete_chat(&self, chat_id: ChatId) -> Result<()> {
        debug!(%chat_id, "deleting room");
        self.blocking(move |engine| engine.update(|tx| rooms::delete_chat(tx, chat_id)))
            .await
    }

    async fn push_message(&self, chat_id: ChatId, message: &Message) -> Result<()> {
        let message = message.clone();
        debug!(%chat_id, msg_id = %message.id, "pushing message");
        self.blocking(move |engine| {
            engine.update(|tx| messages::push_message(tx, chat_id, &message))
        })
        .await
    }

    async fn load_messages(&self) -> Result<ChatMessages> {
        self.blocking(|engine| engine.view(messages::load_messages))
            .await
    }

    async fn delete_message(&self, chat_id: ChatId, msg_id: MessageId) -> Result<()> {
        debug!(%chat_id, %msg_id, "deleting message");
        self.blocking(move |engine| {
            engine.update(|tx| messages::delete_message(tx, chat_id, msg_id))
        })
        .await
    }

    async fn load_profile(&self) -> Result<Profile> {
        self.blocking(|engine| engine.view(profile::load_profile))
            .await
    }

    async fn set_user_name(&self, user_name: &str) -> Result<()> {
        let user_name = user_name.to_string();
        debug!(%user_name, "setting user name");
        self.blocking(move |engine| engine.update(|tx| profile::set_user_name(tx, &user_name)))
            .await
    }

    async fn close(&self) -> Result<()> {
        self.blocking(|engine| engine.close()).await
    }
}

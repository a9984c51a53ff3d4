//! # Robochat Store
//!
//! Persistence engine for Robochat: chat rooms, their messages and the user
//! profile, kept in a single SQLite file shaped as a tree of named buckets.
//!
//! ## Overview
//!
//! The [`engine`] module provides the transaction model: one serialized
//! writer, and readers that each see a stable snapshot. The [`rooms`],
//! [`messages`] and [`profile`] modules are transaction bodies over that
//! engine, and [`ChatStore`] packages them as an async interface.
//!
//! ## Key Types
//!
//! - [`ChatStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Engine`] - The bucket-tree transaction engine
//! - [`StoreConfig`] - Engine tunables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use robochat_core::{ChatId, Message, MessageId};
//! use robochat_store::{ChatStore, SqliteStore};
//!
//! async fn example() -> robochat_store::Result<()> {
//!     let store = SqliteStore::open("chat.db")?;
//!
//!     store.add_room(ChatId(1), "Room_1").await?;
//!     store
//!         .push_message(ChatId(1), &Message::new(MessageId(1), "User", "Hello Robot"))
//!         .await?;
//!
//!     let messages = store.load_messages().await?;
//!     assert_eq!(messages["1"].len(), 1);
//!
//!     store.close().await
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Rooms are pairs**: a `Chats` record and a `Messages/{id}` bucket,
//!   created and removed in one transaction
//! - **Duplicate rooms rejected**: re-adding a room fails with `Conflict`
//! - **Upsert messages**: a message id is unique within its room
//! - **Byte-order keys**: enumeration is lexicographic, not numeric

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod messages;
pub mod migration;
pub mod profile;
pub mod rooms;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use config::{StoreConfig, SyncMode};
pub use engine::{Bucket, BucketMut, Engine, ReadTx, WriteTx};
pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::ChatStore;

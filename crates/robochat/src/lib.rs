//! # Robochat
//!
//! Storage for a small chat service: rooms, the messages inside them, and
//! the profile of the local user, persisted in one embedded store file.
//!
//! ## Overview
//!
//! [`ChatStorage`] is the single entry point. The request-handling layer
//! maps each endpoint to one call:
//!
//! | Endpoint | Call |
//! |---|---|
//! | `GET /rooms` | [`ChatStorage::load_rooms`] |
//! | `POST /rooms` | [`ChatStorage::add_room`] |
//! | `DELETE /rooms` | [`ChatStorage::delete_chat`] |
//! | `GET /messages` | [`ChatStorage::load_messages`] |
//! | `POST /messages` | [`ChatStorage::push_message`] |
//! | `DELETE /messages` | [`ChatStorage::delete_message`] |
//! | `GET /profile` | [`ChatStorage::load_profile`] |
//! | `POST /profile` | [`ChatStorage::set_user_name`] |
//!
//! Translating [`StorageError`] kinds into responses is left to that layer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use robochat::{ChatConfig, ChatStorage};
//!
//! async fn example() -> robochat::Result<()> {
//!     let storage = ChatStorage::open(&ChatConfig::in_dir("/var/lib/robochat"))?;
//!     storage.seed_demo().await?;
//!
//!     for room in storage.load_rooms().await? {
//!         println!("{}: {}", room.chat_id, room.title);
//!     }
//!
//!     storage.close().await
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `robochat::core` - Records and codec (Room, Message, Profile, ...)
//! - `robochat::store` - Storage trait, SQLite and in-memory stores

pub mod config;
pub mod seed;
pub mod storage;

// Re-export component crates
pub use robochat_core as core;
pub use robochat_store as store;

// Re-export main types for convenience
pub use config::ChatConfig;
pub use storage::ChatStorage;

pub use robochat_core::{ChatId, ChatMessages, Message, MessageId, Profile, Room};
pub use robochat_store::{ChatStore, MemoryStore, Result, SqliteStore, StorageError, StoreConfig};

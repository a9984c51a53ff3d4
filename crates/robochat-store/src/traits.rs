//! Store trait: the abstract interface for chat persistence.
//!
//! The request-handling layer depends on this trait only. Implementations
//! are SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use robochat_core::{ChatId, ChatMessages, Message, MessageId, Profile, Room};

use crate::error::Result;

/// Async interface for rooms, messages and the user profile.
///
/// Each mutating method is one atomic transaction: it either commits in full
/// or leaves the store unchanged. Read methods see a consistent snapshot.
///
/// # Design Notes
///
/// - **Rooms are pairs**: a catalog record and a message namespace, created
///   and removed together.
/// - **Upsert messages**: pushing an existing message id replaces it.
/// - **Key order**: rooms and messages enumerate in text-key byte order, so
///   `"10"` comes before `"2"`. Sort client-side for numeric order.
/// - **Closed**: after [`close`](ChatStore::close) every call fails with
///   `StorageError::Closed`.
#[async_trait]
pub trait ChatStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Rooms
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a room with an empty message namespace.
    ///
    /// Fails with `Conflict` if the room already has a message namespace.
    async fn add_room(&self, chat_id: ChatId, title: &str) -> Result<()>;

    /// All rooms in key order. A corrupt record fails the whole call.
    async fn load_rooms(&self) -> Result<Vec<Room>>;

    /// Remove a room and all of its messages.
    ///
    /// Fails with `NotFound`, changing nothing, unless both halves exist.
    async fn delete_chat(&self, chat_id: ChatId) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a message, replacing one with the same id.
    async fn push_message(&self, chat_id: ChatId, message: &Message) -> Result<()>;

    /// Messages of every room, keyed by room key. Empty rooms map to `[]`.
    async fn load_messages(&self) -> Result<ChatMessages>;

    /// Remove a message. An absent message id is a no-op.
    async fn delete_message(&self, chat_id: ChatId, msg_id: MessageId) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Profile
    // ─────────────────────────────────────────────────────────────────────────

    /// The stored profile, or the empty default.
    async fn load_profile(&self) -> Result<Profile>;

    async fn set_user_name(&self, user_name: &str) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Release the store. Idempotent.
    async fn close(&self) -> Result<()>;
}

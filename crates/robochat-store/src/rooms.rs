//! Room catalog operations.
//!
//! A room is two things that must appear and disappear together: its record
//! in `Chats` and its message bucket under `Messages`.

use robochat_core::{ChatId, Record, Room};

use crate::engine::{ReadTx, WriteTx};
use crate::error::{Result, StorageError};
use crate::schema::{Tree, TreeMut};

/// Create room `chat_id` with an empty message bucket.
///
/// Fails with `Conflict` if the room's message bucket already exists, so an
/// existing room never loses its messages.
pub fn add_room(tx: &WriteTx<'_>, chat_id: ChatId, title: &str) -> Result<()> {
    let tree = TreeMut::write(tx)?;
    let key = chat_id.to_key();

    if tree.messages.bucket(key.as_bytes())?.is_some() {
        return Err(StorageError::Conflict(format!("room {} already exists", chat_id)));
    }

    let room = Room::new(chat_id, title);
    tree.chats.put(key.as_bytes(), &room.encode()?)?;
    tree.messages.create_bucket(key.as_bytes())?;
    Ok(())
}

/// Every room in catalog key order.
pub fn load_rooms(tx: &ReadTx<'_>) -> Result<Vec<Room>> {
    let tree = Tree::read(tx)?;
    let mut rooms = Vec::new();
    tree.chats.for_each(|_, value| {
        rooms.push(Room::decode(value)?);
        Ok(())
    })?;
    Ok(rooms)
}

/// Remove room `chat_id` and all of its messages.
///
/// Fails with `NotFound` unless both the catalog entry and the message
/// bucket exist; in that case nothing is removed.
pub fn delete_chat(tx: &WriteTx<'_>, chat_id: ChatId) -> Result<()> {
    let tree = TreeMut::write(tx)?;
    let key = chat_id.to_key();

    tree.messages.delete_bucket(key.as_bytes()).map_err(|err| match err {
        StorageError::NotFound(_) => {
            StorageError::NotFound(format!("messages of room {}", chat_id))
        }
        other => other,
    })?;

    if tree.chats.get(key.as_bytes())?.is_none() {
        return Err(StorageError::NotFound(format!("room {}", chat_id)));
    }
    tree.chats.delete(key.as_bytes())?;
    Ok(())
}

//! Message operations over a room's message bucket.

use robochat_core::{ChatId, ChatMessages, Message, MessageId, Record};

use crate::engine::{BucketMut, ReadTx, WriteTx};
use crate::error::{Result, StorageError};
use crate::schema::{Tree, TreeMut};

/// Store `message` in room `chat_id`, replacing any message with the same id.
pub fn push_message(tx: &WriteTx<'_>, chat_id: ChatId, message: &Message) -> Result<()> {
    let room = room_bucket(tx, chat_id)?;
    room.put(message.id.to_key().as_bytes(), &message.encode()?)
}

/// Messages of every room, keyed by the room's text key.
///
/// A room without messages maps to an empty list.
pub fn load_messages(tx: &ReadTx<'_>) -> Result<ChatMessages> {
    let tree = Tree::read(tx)?;
    let mut result = ChatMessages::new();

    tree.messages.for_each_bucket(|name, room| {
        // Room buckets are only ever named by `ChatId::to_key`.
        let chat_id = ChatId::from_key(name)?;

        let mut list = Vec::new();
        room.for_each(|_, value| {
            list.push(Message::decode(value)?);
            Ok(())
        })?;

        result.insert(chat_id.to_key(), list);
        Ok(())
    })?;

    Ok(result)
}

/// Remove message `msg_id` from room `chat_id`.
///
/// An absent message is not an error; an absent room is.
pub fn delete_message(tx: &WriteTx<'_>, chat_id: ChatId, msg_id: MessageId) -> Result<()> {
    let room = room_bucket(tx, chat_id)?;
    room.delete(msg_id.to_key().as_bytes())
}

fn room_bucket<'tx>(tx: &WriteTx<'tx>, chat_id: ChatId) -> Result<BucketMut<'tx>> {
    let tree = TreeMut::write(tx)?;
    tree.messages
        .bucket_mut(chat_id.to_key().as_bytes())?
        .ok_or_else(|| StorageError::NotFound(format!("room {}", chat_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::engine::Engine;
    use crate::{rooms, schema};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn engine_with_room(chat_id: i64) -> (TempDir, Engine) {
        let dir = TempDir::new().unwrap();
        let engine = Engine::open(dir.path().join("chat.db"), &StoreConfig::default()).unwrap();
        engine.update(schema::ensure).unwrap();
        engine
            .update(|tx| rooms::add_room(tx, ChatId(chat_id), "Room"))
            .unwrap();
        (dir, engine)
    }

    fn msg(id: i64, author: &str, text: &str) -> Message {
        Message::new(MessageId(id), author, text)
    }

    #[test]
    fn test_push_and_load() {
        let (_dir, engine) = engine_with_room(1);
        let hello = msg(1, "User", "Hello Robot");
        let hi = msg(2, "Robot", "Hi User!");

        engine.update(|tx| push_message(tx, ChatId(1), &hello)).unwrap();
        engine.update(|tx| push_message(tx, ChatId(1), &hi)).unwrap();

        let all = engine.view(load_messages).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["1"], vec![hello, hi]);
    }

    #[test]
    fn test_push_is_upsert() {
        let (_dir, engine) = engine_with_room(1);

        engine
            .update(|tx| push_message(tx, ChatId(1), &msg(4, "a", "first")))
            .unwrap();
        engine
            .update(|tx| push_message(tx, ChatId(1), &msg(4, "b", "second")))
            .unwrap();

        let all = engine.view(load_messages).unwrap();
        assert_eq!(all["1"], vec![msg(4, "b", "second")]);
    }

    #[test]
    fn test_push_to_missing_room() {
        let (_dir, engine) = engine_with_room(1);
        let result = engine.update(|tx| push_message(tx, ChatId(2), &msg(1, "a", "b")));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_empty_room_has_empty_list() {
        let (_dir, engine) = engine_with_room(8);
        let all = engine.view(load_messages).unwrap();
        assert_eq!(all.get("8"), Some(&Vec::new()));
    }

    #[test]
    fn test_messages_in_key_order() {
        let (_dir, engine) = engine_with_room(1);
        for id in [2, 10, 1] {
            engine
                .update(|tx| push_message(tx, ChatId(1), &msg(id, "a", "t")))
                .unwrap();
        }

        let ids: Vec<i64> = engine.view(load_messages).unwrap()["1"]
            .iter()
            .map(|m| m.id.0)
            .collect();
        assert_eq!(ids, vec![1, 10, 2]);
    }

    #[test]
    fn test_delete_message() {
        let (_dir, engine) = engine_with_room(1);
        engine
            .update(|tx| push_message(tx, ChatId(1), &msg(1, "a", "gone")))
            .unwrap();
        engine
            .update(|tx| push_message(tx, ChatId(1), &msg(2, "a", "kept")))
            .unwrap();

        engine
            .update(|tx| delete_message(tx, ChatId(1), MessageId(1)))
            .unwrap();
        // Absent id: no-op.
        engine
            .update(|tx| delete_message(tx, ChatId(1), MessageId(99)))
            .unwrap();

        let all = engine.view(load_messages).unwrap();
        assert_eq!(all["1"], vec![msg(2, "a", "kept")]);
    }

    #[test]
    fn test_delete_message_missing_room() {
        let (_dir, engine) = engine_with_room(1);
        let result = engine.update(|tx| delete_message(tx, ChatId(5), MessageId(1)));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_message_aborts_load() {
        let (_dir, engine) = engine_with_room(1);
        engine
            .update(|tx| {
                let tree = TreeMut::write(tx)?;
                tree.messages.bucket_mut(b"1")?.unwrap().put(b"1", b"[]")
            })
            .unwrap();

        let result = engine.view(load_messages);
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_last_push_wins(id in 0i64..10_000, first in "\\PC{0,40}", second in "\\PC{0,40}") {
            let (_dir, engine) = engine_with_room(1);

            engine.update(|tx| push_message(tx, ChatId(1), &msg(id, "a", &first))).unwrap();
            engine.update(|tx| push_message(tx, ChatId(1), &msg(id, "b", &second))).unwrap();

            let all = engine.view(load_messages).unwrap();
            prop_assert_eq!(&all["1"], &vec![msg(id, "b", &second)]);
        }
    }
}

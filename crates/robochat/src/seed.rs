//! Startup data installed by [`ChatStorage::seed_demo`](crate::ChatStorage::seed_demo).

use robochat_core::{ChatId, Message, MessageId, Room};

pub const ROOM_ID: ChatId = ChatId(1);
pub const ROOM_TITLE: &str = "Room_1";
pub const USER_NAME: &str = "User";

/// The seeded room as `load_rooms` returns it.
pub fn room() -> Room {
    Room::new(ROOM_ID, ROOM_TITLE)
}

/// The greeting exchange of [`room`], in key order.
pub fn messages() -> Vec<Message> {
    vec![
        Message::new(MessageId(1), USER_NAME, "Hello Robot"),
        Message::new(MessageId(2), "Robot", "Hi User!"),
    ]
}

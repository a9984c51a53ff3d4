//! Proptest generators for property-based testing.

use proptest::prelude::*;

use robochat_core::{ChatId, Message, MessageId, Profile, Room};

/// Generate a ChatId across the whole `i64` range.
pub fn chat_id() -> impl Strategy<Value = ChatId> {
    any::<i64>().prop_map(ChatId)
}

/// Generate a MessageId across the whole `i64` range.
pub fn message_id() -> impl Strategy<Value = MessageId> {
    any::<i64>().prop_map(MessageId)
}

/// Generate free text, including non-ASCII and markup characters.
pub fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "\\PC{0,128}",
        1 => Just("<b>\"Привет\" & 你好 🤖</b>".to_string()),
    ]
}

/// Generate a user or author name.
pub fn name() -> impl Strategy<Value = String> {
    "[A-Za-zА-Яа-я0-9_ ]{0,24}"
}

pub fn room() -> impl Strategy<Value = Room> {
    (chat_id(), text(), any::<i32>()).prop_map(|(chat_id, title, income)| Room {
        chat_id,
        title,
        income,
    })
}

pub fn message() -> impl Strategy<Value = Message> {
    (message_id(), name(), text()).prop_map(|(id, author, text)| Message { id, author, text })
}

pub fn profile() -> impl Strategy<Value = Profile> {
    name().prop_map(|user_name| Profile { user_name })
}

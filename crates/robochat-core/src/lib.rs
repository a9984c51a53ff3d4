//! # Robochat Core
//!
//! Pure records for the Robochat persistence engine: identifiers, rooms,
//! messages, the user profile, and the codec that turns them into stored
//! bytes.
//!
//! This crate contains no I/O and no storage. The store crate decides where
//! the bytes produced here live.
//!
//! ## Key Types
//!
//! - [`ChatId`] / [`MessageId`] - Numeric identifiers with canonical text keys
//! - [`Room`] - Catalog entry for a chat room
//! - [`Message`] - A single message inside a room
//! - [`Profile`] - The singleton user profile
//! - [`Record`] - Encode/decode contract shared by the three records
//!
//! ## Encoding
//!
//! Records are stored as field-tagged JSON. See the [`codec`] module.

pub mod codec;
pub mod error;
pub mod model;
pub mod types;

pub use codec::Record;
pub use error::CoreError;
pub use model::{ChatMessages, Message, Profile, Room};
pub use types::{ChatId, MessageId};

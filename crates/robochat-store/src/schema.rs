//! Bucket layout of the chat store.
//!
//! ```text
//! Robochat
//! ├── Chats       chatID  -> Room
//! ├── Messages
//! │   └── {chatID}  msgID -> Message     (one bucket per room)
//! └── Profile     "UserName" -> Profile
//! ```
//!
//! Every key in `Chats` has a bucket of the same name under `Messages` and
//! vice versa. Only `rooms::add_room` and `rooms::delete_chat` create or
//! remove such a pair, each inside a single transaction.

use crate::engine::{Bucket, BucketMut, ReadTx, WriteTx};
use crate::error::{Result, StorageError};

pub const ROOT: &[u8] = b"Robochat";
pub const CHATS: &[u8] = b"Chats";
pub const MESSAGES: &[u8] = b"Messages";
pub const PROFILE: &[u8] = b"Profile";

/// Key of the singleton profile record inside `Profile`.
pub const USER_NAME_KEY: &[u8] = b"UserName";

/// Create the root bucket and its fixed children where missing.
///
/// Idempotent: an initialized tree is left exactly as it is.
pub fn ensure(tx: &WriteTx<'_>) -> Result<()> {
    let root = tx.create_bucket_if_not_exists(ROOT)?;
    for name in [CHATS, MESSAGES, PROFILE] {
        root.create_bucket_if_not_exists(name)?;
    }
    Ok(())
}

/// The fixed buckets, resolved for reading.
pub struct Tree<'tx> {
    pub chats: Bucket<'tx>,
    pub messages: Bucket<'tx>,
    pub profile: Bucket<'tx>,
}

impl<'tx> Tree<'tx> {
    pub fn read(tx: &ReadTx<'tx>) -> Result<Self> {
        let root = tx.bucket(ROOT)?.ok_or_else(|| missing(ROOT))?;
        Ok(Self {
            chats: root.bucket(CHATS)?.ok_or_else(|| missing(CHATS))?,
            messages: root.bucket(MESSAGES)?.ok_or_else(|| missing(MESSAGES))?,
            profile: root.bucket(PROFILE)?.ok_or_else(|| missing(PROFILE))?,
        })
    }
}

/// The fixed buckets, resolved for writing.
pub struct TreeMut<'tx> {
    pub chats: BucketMut<'tx>,
    pub messages: BucketMut<'tx>,
    pub profile: BucketMut<'tx>,
}

impl<'tx> TreeMut<'tx> {
    pub fn write(tx: &WriteTx<'tx>) -> Result<Self> {
        let root = tx.bucket(ROOT)?.ok_or_else(|| missing(ROOT))?;
        Ok(Self {
            chats: root.bucket_mut(CHATS)?.ok_or_else(|| missing(CHATS))?,
            messages: root.bucket_mut(MESSAGES)?.ok_or_else(|| missing(MESSAGES))?,
            profile: root.bucket_mut(PROFILE)?.ok_or_else(|| missing(PROFILE))?,
        })
    }
}

fn missing(name: &[u8]) -> StorageError {
    StorageError::InvalidData(format!(
        "bucket {} is missing; the store was not initialized",
        String::from_utf8_lossy(name)
    ))
}

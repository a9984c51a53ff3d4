//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::{Path, PathBuf};

use robochat_store::{SqliteStore, StoreConfig};
use tempfile::TempDir;

/// A SQLite store in a temporary directory, removed on drop.
pub struct TestStore {
    pub store: SqliteStore,
    path: PathBuf,
    // Dropped last.
    _dir: TempDir,
}

impl TestStore {
    /// Create a fresh store with default settings.
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("chat.db");
        let store = SqliteStore::open_with_config(&path, config).expect("open test store");
        Self {
            store,
            path,
            _dir: dir,
        }
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a second, independent handle on the same file.
    pub fn reopen(&self) -> SqliteStore {
        SqliteStore::open(&self.path).expect("reopen test store")
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robochat_core::{ChatId, Message, MessageId, Room};
    use robochat_store::ChatStore;

    #[tokio::test]
    async fn test_store_fixture_persists_across_handles() {
        let fixture = TestStore::new();
        assert!(fixture.path().ends_with("chat.db"));

        let message = Message::new(MessageId(1), "User", "Привет");
        fixture.store.add_room(ChatId(1), "Room_1").await.unwrap();
        fixture.store.push_message(ChatId(1), &message).await.unwrap();
        fixture.store.close().await.unwrap();

        let reopened = fixture.reopen();
        assert_eq!(
            reopened.load_rooms().await.unwrap(),
            vec![Room::new(ChatId(1), "Room_1")]
        );
        assert_eq!(reopened.load_messages().await.unwrap()["1"], vec![message]);
    }
}

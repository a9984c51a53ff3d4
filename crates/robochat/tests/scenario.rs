//! End-to-end behavior of the storage facade over a real store file.

use robochat::store::{rooms, schema::Tree};
use robochat::{
    seed, ChatConfig, ChatId, ChatStorage, Message, MessageId, Room, StorageError, StoreConfig,
};
use robochat_testkit::init_tracing;
use tempfile::TempDir;

fn open_in(dir: &TempDir) -> ChatStorage {
    ChatStorage::open(&ChatConfig::in_dir(dir.path())).unwrap()
}

#[tokio::test]
async fn test_application_scenario() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let storage = open_in(&dir);

    storage.add_room(ChatId(1), "Room_1").await.unwrap();
    storage
        .push_message(ChatId(1), &Message::new(MessageId(1), "User", "Hello Robot"))
        .await
        .unwrap();
    storage
        .push_message(ChatId(1), &Message::new(MessageId(2), "Robot", "Hi User!"))
        .await
        .unwrap();
    storage.set_user_name("User").await.unwrap();

    assert_eq!(
        storage.load_rooms().await.unwrap(),
        vec![Room {
            chat_id: ChatId(1),
            title: "Room_1".to_string(),
            income: 0,
        }]
    );

    let messages = storage.load_messages().await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages["1"], seed::messages());

    assert_eq!(storage.load_profile().await.unwrap().user_name, "User");
}

#[tokio::test]
async fn test_seed_survives_restart() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    let storage = open_in(&dir);
    storage.seed_demo().await.unwrap();
    storage
        .push_message(ChatId(1), &Message::new(MessageId(3), "User", "Ещё раз"))
        .await
        .unwrap();
    storage.close().await.unwrap();

    // Second start: opening and seeding again changes nothing but the seed.
    let storage = open_in(&dir);
    storage.seed_demo().await.unwrap();

    assert_eq!(storage.load_rooms().await.unwrap(), vec![seed::room()]);
    let texts: Vec<String> = storage.load_messages().await.unwrap()["1"]
        .iter()
        .map(|m| m.text.clone())
        .collect();
    assert_eq!(texts, vec!["Hello Robot", "Hi User!", "Ещё раз"]);
}

#[tokio::test]
async fn test_missing_room_errors() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let storage = open_in(&dir);
    storage.add_room(ChatId(1), "Room_1").await.unwrap();

    let err = storage
        .push_message(ChatId(9), &Message::new(MessageId(1), "User", "lost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = storage
        .delete_message(ChatId(9), MessageId(1))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = storage.delete_chat(ChatId(9)).await.unwrap_err();
    assert!(err.is_not_found());

    storage.delete_message(ChatId(1), MessageId(1)).await.unwrap();
}

#[tokio::test]
async fn test_delete_chat_then_readd() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let storage = open_in(&dir);
    storage.seed_demo().await.unwrap();

    storage.delete_chat(ChatId(1)).await.unwrap();
    assert!(storage.load_rooms().await.unwrap().is_empty());
    assert!(!storage.load_messages().await.unwrap().contains_key("1"));

    storage.add_room(ChatId(1), "Fresh").await.unwrap();
    assert!(storage.load_messages().await.unwrap()["1"].is_empty());
}

#[tokio::test]
async fn test_failed_transaction_leaves_no_room() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let storage = open_in(&dir);
    let engine = storage.store().engine();

    let result: robochat::Result<()> = engine.update(|tx| {
        rooms::add_room(tx, ChatId(5), "Half")?;
        Err(StorageError::InvalidData("simulated failure".into()))
    });
    assert!(result.is_err());

    let present = engine
        .view(|tx| {
            let tree = Tree::read(tx)?;
            Ok((tree.chats.get(b"5")?.is_some(), tree.messages.bucket(b"5")?.is_some()))
        })
        .unwrap();
    assert_eq!(present, (false, false));
    assert!(storage.load_rooms().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reader_sees_snapshot_while_writer_commits() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let storage = open_in(&dir);
    storage.add_room(ChatId(1), "Before").await.unwrap();

    let engine = storage.store().engine();
    let (before, after) = engine
        .view(|tx| {
            let before = rooms::load_rooms(tx)?.len();
            std::thread::scope(|s| {
                s.spawn(|| engine.update(|wtx| rooms::add_room(wtx, ChatId(2), "During")))
                    .join()
                    .unwrap()
            })?;
            let after = rooms::load_rooms(tx)?.len();
            Ok((before, after))
        })
        .unwrap();

    assert_eq!((before, after), (1, 1));
    assert_eq!(storage.load_rooms().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let storage = open_in(&dir);

    let tasks: Vec<_> = (1..=8)
        .map(|room| {
            let storage = storage.clone();
            tokio::spawn(async move {
                storage.add_room(ChatId(room), &format!("Room_{}", room)).await?;
                for id in 1..=10 {
                    let message = Message::new(MessageId(id), "bot", format!("{}/{}", room, id));
                    storage.push_message(ChatId(room), &message).await?;
                    storage.load_messages().await?;
                }
                Ok::<_, StorageError>(())
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let messages = storage.load_messages().await.unwrap();
    assert_eq!(messages.len(), 8);
    assert!(messages.values().all(|list| list.len() == 10));
}

#[tokio::test]
async fn test_closed_storage() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let storage = open_in(&dir);
    storage.close().await.unwrap();
    storage.close().await.unwrap();

    assert!(matches!(
        storage.load_profile().await,
        Err(StorageError::Closed)
    ));
    assert!(matches!(
        storage.delete_chat(ChatId(1)).await,
        Err(StorageError::Closed)
    ));
}

#[test]
fn test_open_rejects_bad_config() {
    let empty = ChatConfig::new("");
    assert!(matches!(
        ChatStorage::open(&empty),
        Err(StorageError::InvalidConfig(_))
    ));

    let dir = TempDir::new().unwrap();
    let config = ChatConfig {
        store: StoreConfig {
            read_pool_size: 0,
            ..StoreConfig::default()
        },
        ..ChatConfig::in_dir(dir.path())
    };
    assert!(matches!(
        ChatStorage::open(&config),
        Err(StorageError::InvalidConfig(_))
    ));
}

#[test]
fn test_config_from_json() {
    let config: ChatConfig = serde_json::from_str(
        r#"{ "db_path": "/tmp/robochat/chat.db", "store": { "busy_timeout_ms": 250 } }"#,
    )
    .unwrap();
    assert_eq!(config.store.busy_timeout_ms, 250);
    assert_eq!(config.store.read_pool_size, StoreConfig::default().read_pool_size);
}

//! Transaction engine: a tree of named buckets on top of SQLite.
//!
//! The database runs in WAL mode with one writer connection and a small pool
//! of read-only connections:
//!
//! - [`Engine::update`] runs on the writer behind a mutex, inside an
//!   `IMMEDIATE` transaction. Writers are totally ordered. A closure that
//!   returns `Err` leaves the tree untouched.
//! - [`Engine::view`] runs on a reader inside a deferred transaction whose
//!   snapshot is pinned before the closure starts. Readers never wait on the
//!   writer or on each other, and never see a commit that lands after their
//!   snapshot.
//!
//! Buckets nest without limit. A bucket holds plain key/value entries and
//! child buckets in two separate key spaces. Both enumerate in byte order.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{Result, StorageError};
use crate::migration;

/// Parent id of top-level buckets. SQLite rowids start at 1.
const TOP_LEVEL: i64 = 0;

/// SQLite-backed bucket tree.
///
/// Thread-safe: share it behind an `Arc` and call `update`/`view` from any
/// thread.
pub struct Engine {
    path: PathBuf,
    config: StoreConfig,
    /// The single writer connection. `None` once closed.
    writer: Mutex<Option<Connection>>,
    /// Pooled read-only connections. `None` once closed.
    readers: Vec<Mutex<Option<Connection>>>,
    closed: AtomicBool,
}

impl Engine {
    /// Open (creating if needed) the database file at `path`.
    ///
    /// Runs schema migrations but does not create any bucket. In-memory
    /// databases are refused: every pooled connection must see one file.
    pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StorageError::InvalidConfig(
                "database path is not specified".to_string(),
            ));
        }
        if is_in_memory(path) {
            return Err(StorageError::InvalidConfig(format!(
                "{} is not a file; the store needs one file shared by all connections",
                path.display()
            )));
        }
        config.validate()?;

        let mut writer = open_connection(path, config)?;
        let mode: String = writer.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            return Err(StorageError::InvalidConfig(format!(
                "{} cannot run in WAL mode (journal mode is {})",
                path.display(),
                mode
            )));
        }
        migration::migrate(&mut writer)?;

        let readers = (0..config.read_pool_size)
            .map(|_| open_reader(path, config).map(|conn| Mutex::new(Some(conn))))
            .collect::<Result<Vec<_>>>()?;

        info!(path = %path.display(), readers = readers.len(), "opened store");

        Ok(Self {
            path: path.to_path_buf(),
            config: config.clone(),
            writer: Mutex::new(Some(writer)),
            readers,
            closed: AtomicBool::new(false),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Run `f` in a read-write transaction.
    ///
    /// Commits if `f` returns `Ok`; otherwise every write made by `f` is
    /// discarded and the error is returned unchanged.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&WriteTx<'_>) -> Result<T>,
    {
        self.ensure_open()?;

        let mut guard = self.writer.lock().unwrap_or_else(|poisoned| {
            // A panicking closure unwound through its transaction, which
            // rolled it back on drop.
            warn!("recovering poisoned writer connection");
            poisoned.into_inner()
        });
        let conn = guard.as_mut().ok_or(StorageError::Closed)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = f(&WriteTx { conn: &*tx });
        match outcome {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "rolling back write transaction");
                // Dropping an unfinished transaction rolls it back.
                drop(tx);
                Err(err)
            }
        }
    }

    /// Run `f` in a read-only transaction over a stable snapshot.
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTx<'_>) -> Result<T>,
    {
        self.ensure_open()?;

        let mut reader = self.reader()?;
        let conn = reader.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;

        // A deferred transaction takes its snapshot at the first read.
        tx.query_row("SELECT 1 FROM buckets LIMIT 1", [], |row| row.get::<_, i64>(0))
            .optional()?;

        let value = f(&ReadTx { conn: &*tx })?;
        tx.commit()?;
        Ok(value)
    }

    /// Release every connection. Later transactions fail with `Closed`.
    ///
    /// Waits for in-flight transactions to finish. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        for slot in &self.readers {
            slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        }

        let writer = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(conn) = writer {
            conn.close().map_err(|(_, err)| StorageError::Database(err))?;
        }

        info!(path = %self.path.display(), "closed store");
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    /// Borrow an idle pooled reader, or open a transient one if all are busy.
    fn reader(&self) -> Result<Reader<'_>> {
        for slot in &self.readers {
            match slot.try_lock() {
                Ok(guard) => return Ok(Reader::Pooled(guard)),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(poisoned)) => {
                    warn!("recovering poisoned reader connection");
                    return Ok(Reader::Pooled(poisoned.into_inner()));
                }
            }
        }

        debug!("reader pool exhausted, opening transient connection");
        Ok(Reader::Transient(open_reader(&self.path, &self.config)?))
    }
}

enum Reader<'a> {
    Pooled(MutexGuard<'a, Option<Connection>>),
    Transient(Connection),
}

impl Reader<'_> {
    fn connection(&mut self) -> Result<&mut Connection> {
        match self {
            Reader::Pooled(guard) => guard.as_mut().ok_or(StorageError::Closed),
            Reader::Transient(conn) => Ok(conn),
        }
    }
}

fn open_connection(path: &Path, config: &StoreConfig) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(config.busy_timeout())?;
    conn.execute_batch(&format!(
        "PRAGMA synchronous = {};",
        config.sync_mode.pragma_value()
    ))?;
    Ok(conn)
}

fn open_reader(path: &Path, config: &StoreConfig) -> Result<Connection> {
    let conn = open_connection(path, config)?;
    conn.execute_batch("PRAGMA query_only = ON;")?;
    Ok(conn)
}

/// SQLite's private in-memory databases: `:memory:` and memory URIs.
fn is_in_memory(path: &Path) -> bool {
    let text = path.to_string_lossy();
    text == ":memory:" || text.starts_with("file::memory:") || text.contains("mode=memory")
}

// ─────────────────────────────────────────────────────────────────────────────
// Transactions
// ─────────────────────────────────────────────────────────────────────────────

/// A read-only transaction.
pub struct ReadTx<'tx> {
    conn: &'tx Connection,
}

impl<'tx> ReadTx<'tx> {
    /// Look up a top-level bucket.
    pub fn bucket(&self, name: &[u8]) -> Result<Option<Bucket<'tx>>> {
        Bucket::top_level(self.conn).bucket(name)
    }
}

/// A read-write transaction.
pub struct WriteTx<'tx> {
    conn: &'tx Connection,
}

impl<'tx> WriteTx<'tx> {
    /// Look up a top-level bucket for writing.
    pub fn bucket(&self, name: &[u8]) -> Result<Option<BucketMut<'tx>>> {
        BucketMut::top_level(self.conn).bucket_mut(name)
    }

    pub fn create_bucket_if_not_exists(&self, name: &[u8]) -> Result<BucketMut<'tx>> {
        BucketMut::top_level(self.conn).create_bucket_if_not_exists(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Buckets
// ─────────────────────────────────────────────────────────────────────────────

/// Read handle to a bucket, valid for the transaction that produced it.
#[derive(Clone, Copy)]
pub struct Bucket<'tx> {
    conn: &'tx Connection,
    id: i64,
}

impl<'tx> Bucket<'tx> {
    fn top_level(conn: &'tx Connection) -> Self {
        Self {
            conn,
            id: TOP_LEVEL,
        }
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM entries WHERE bucket = ?1 AND key = ?2",
                params![self.id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Child bucket called `name`, if any.
    pub fn bucket(&self, name: &[u8]) -> Result<Option<Bucket<'tx>>> {
        Ok(child_id(self.conn, self.id, name)?.map(|id| Bucket {
            conn: self.conn,
            id,
        }))
    }

    /// Visit every entry in key byte order. Stops at the first error.
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> Result<()>,
    {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM entries WHERE bucket = ?1 ORDER BY key")?;
        let mut rows = stmt.query(params![self.id])?;
        while let Some(row) = rows.next()? {
            let key: Vec<u8> = row.get(0)?;
            let value: Vec<u8> = row.get(1)?;
            f(&key, &value)?;
        }
        Ok(())
    }

    /// Visit every child bucket in name byte order. Stops at the first error.
    pub fn for_each_bucket<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], Bucket<'tx>) -> Result<()>,
    {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM buckets WHERE parent = ?1 ORDER BY name")?;
        let mut rows = stmt.query(params![self.id])?;
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let name: Vec<u8> = row.get(1)?;
            f(
                &name,
                Bucket {
                    conn: self.conn,
                    id,
                },
            )?;
        }
        Ok(())
    }

    /// Number of entries (child buckets excluded).
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE bucket = ?1",
            params![self.id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Write handle to a bucket. Dereferences to [`Bucket`] for reads.
pub struct BucketMut<'tx> {
    inner: Bucket<'tx>,
}

impl<'tx> Deref for BucketMut<'tx> {
    type Target = Bucket<'tx>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'tx> BucketMut<'tx> {
    fn top_level(conn: &'tx Connection) -> Self {
        Self {
            inner: Bucket::top_level(conn),
        }
    }

    fn conn(&self) -> &'tx Connection {
        self.inner.conn
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.conn().execute(
            "INSERT INTO entries (bucket, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(bucket, key) DO UPDATE SET value = excluded.value",
            params![self.inner.id, key, value],
        )?;
        Ok(())
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.conn().execute(
            "DELETE FROM entries WHERE bucket = ?1 AND key = ?2",
            params![self.inner.id, key],
        )?;
        Ok(())
    }

    /// Child bucket called `name`, for writing.
    pub fn bucket_mut(&self, name: &[u8]) -> Result<Option<BucketMut<'tx>>> {
        Ok(self.inner.bucket(name)?.map(|inner| BucketMut { inner }))
    }

    /// Create child bucket `name`. Fails with `Conflict` if it exists.
    pub fn create_bucket(&self, name: &[u8]) -> Result<BucketMut<'tx>> {
        if child_id(self.conn(), self.inner.id, name)?.is_some() {
            return Err(StorageError::Conflict(format!(
                "bucket {} already exists",
                display_name(name)
            )));
        }

        self.conn().execute(
            "INSERT INTO buckets (parent, name) VALUES (?1, ?2)",
            params![self.inner.id, name],
        )?;
        Ok(BucketMut {
            inner: Bucket {
                conn: self.conn(),
                id: self.conn().last_insert_rowid(),
            },
        })
    }

    pub fn create_bucket_if_not_exists(&self, name: &[u8]) -> Result<BucketMut<'tx>> {
        match self.bucket_mut(name)? {
            Some(bucket) => Ok(bucket),
            None => self.create_bucket(name),
        }
    }

    /// Delete child bucket `name` with all its entries and descendants.
    ///
    /// Fails with `NotFound` if there is no such bucket.
    pub fn delete_bucket(&self, name: &[u8]) -> Result<()> {
        let root = child_id(self.conn(), self.inner.id, name)?.ok_or_else(|| {
            StorageError::NotFound(format!("bucket {}", display_name(name)))
        })?;

        // Collect the subtree before deleting anything from it.
        let ids: Vec<i64> = self
            .conn()
            .prepare(
                "WITH RECURSIVE subtree(id) AS (
                     SELECT ?1
                     UNION ALL
                     SELECT b.id FROM buckets b JOIN subtree s ON b.parent = s.id
                 )
                 SELECT id FROM subtree",
            )?
            .query_map(params![root], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for &id in &ids {
            self.conn()
                .execute("DELETE FROM entries WHERE bucket = ?1", params![id])?;
            self.conn()
                .execute("DELETE FROM buckets WHERE id = ?1", params![id])?;
        }
        Ok(())
    }
}

fn child_id(conn: &Connection, parent: i64, name: &[u8]) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM buckets WHERE parent = ?1 AND name = ?2",
            params![parent, name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

fn display_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

//! Record store backends
//!
//! `RecordStore` is the synchronous contract every backend implements. The
//! async, timeout-bounded surface used by request handlers lives on
//! `StoreHandle`, which runs these calls on the blocking pool.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock};

use super::errors::{StorageError, StorageResult};
use super::reader::StorageReader;
use super::writer::StorageWriter;
use crate::session::{sort_sessions, GameSession, StoredSession};

/// File name of the game session collection inside a data directory.
pub const COLLECTION_FILE: &str = "games.dat";

/// Operations offered by a game session collection.
///
/// Each call is atomic from the caller's point of view.
pub trait RecordStore: Send + Sync {
    /// Persists a validated session and returns its stored form.
    fn insert(&self, session: GameSession) -> StorageResult<StoredSession>;

    /// Returns every record in store-native (insertion) order.
    fn find_all(&self) -> StorageResult<Vec<StoredSession>>;

    /// Returns every record ordered by `stageName`, then `isPostShock`.
    fn find_all_sorted(&self) -> StorageResult<Vec<StoredSession>> {
        let mut sessions = self.find_all()?;
        sort_sessions(&mut sessions);
        Ok(sessions)
    }

    /// Removes every record and returns how many were removed.
    fn delete_all(&self) -> StorageResult<u64>;

    /// Flushes any buffered state before the store is dropped.
    fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Where the record store lives, parsed from the connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    /// Durable record file inside this directory
    File(PathBuf),
    /// Non-durable in-process store
    Memory,
}

impl StoreTarget {
    /// Parses a connection string.
    ///
    /// Accepted forms: `file://<dir>`, `memory://`, or a bare directory path.
    pub fn parse(uri: &str) -> Result<Self, String> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err("connection string is empty".into());
        }

        if let Some(path) = uri.strip_prefix("file://") {
            if path.is_empty() {
                return Err("file:// connection string has no path".into());
            }
            return Ok(StoreTarget::File(PathBuf::from(path)));
        }

        if let Some(rest) = uri.strip_prefix("memory://") {
            if !rest.is_empty() {
                return Err(format!("memory:// takes no path, got '{}'", rest));
            }
            return Ok(StoreTarget::Memory);
        }

        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(format!("unsupported store scheme '{}'", scheme));
        }

        Ok(StoreTarget::File(PathBuf::from(uri)))
    }

    /// Opens the backend this target points at.
    pub fn open(&self) -> StorageResult<Box<dyn RecordStore>> {
        match self {
            StoreTarget::File(dir) => Ok(Box::new(FileStore::open(dir)?)),
            StoreTarget::Memory => Ok(Box::new(MemoryStore::new())),
        }
    }
}

impl fmt::Display for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreTarget::File(dir) => write!(f, "file://{}", dir.display()),
            StoreTarget::Memory => write!(f, "memory://"),
        }
    }
}

/// Durable store backed by an append-only record file.
///
/// Writers and readers share one mutex so a scan never observes a
/// half-written append.
pub struct FileStore {
    writer: Mutex<StorageWriter>,
}

impl FileStore {
    /// Opens (or creates) the collection file inside `data_dir`.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let writer = StorageWriter::open(&data_dir.join(COLLECTION_FILE))?;
        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, StorageWriter>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::unavailable("storage writer lock poisoned"))
    }
}

impl RecordStore for FileStore {
    fn insert(&self, session: GameSession) -> StorageResult<StoredSession> {
        let stored = StoredSession::assign(session);
        self.lock()?.write(&stored)?;
        Ok(stored)
    }

    fn find_all(&self) -> StorageResult<Vec<StoredSession>> {
        let writer = self.lock()?;
        StorageReader::open(writer.path())?.read_sessions()
    }

    fn delete_all(&self) -> StorageResult<u64> {
        self.lock()?.truncate_all()
    }

    fn close(&self) -> StorageResult<()> {
        self.lock()?.sync()
    }
}

/// In-process store; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<Vec<StoredSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, session: GameSession) -> StorageResult<StoredSession> {
        let stored = StoredSession::assign(session);
        self.sessions
            .write()
            .map_err(|_| StorageError::unavailable("memory store lock poisoned"))?
            .push(stored.clone());
        Ok(stored)
    }

    fn find_all(&self) -> StorageResult<Vec<StoredSession>> {
        Ok(self
            .sessions
            .read()
            .map_err(|_| StorageError::unavailable("memory store lock poisoned"))?
            .clone())
    }

    fn delete_all(&self) -> StorageResult<u64> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| StorageError::unavailable("memory store lock poisoned"))?;
        let removed = sessions.len() as u64;
        sessions.clear();
        Ok(removed)
    }
}

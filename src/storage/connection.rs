//! Process-wide store handle
//!
//! The handle owns the backend and its connection lifecycle:
//!
//! - `connect` returns immediately and opens the backend in the background
//! - a failed open is retried every `reconnect_delay`, indefinitely
//! - an operation that hits an I/O failure drops the backend and wakes the
//!   supervisor to reopen it
//! - operations wait for a connected backend, bounded by `operation_timeout`
//! - once a backend call has started it runs to completion, so a reported
//!   failure never leaves a write behind
//! - `close` is terminal
//!
//! Backends are synchronous; every operation runs on the blocking pool.

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

use super::errors::{StorageError, StorageResult};
use super::store::{RecordStore, StoreTarget};
use crate::observability::Event;
use crate::session::{GameSession, StoredSession};

/// Default wait between connection attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Default bound on waiting for a connection before an operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Connection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub reconnect_delay: Duration,
    pub operation_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// First connection attempt not yet successful
    Connecting,
    /// Backend open
    Connected,
    /// Backend lost or an attempt failed; retrying
    Disconnected,
    /// Handle closed, no further operations
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

type Opener = Box<dyn Fn() -> StorageResult<Arc<dyn RecordStore>> + Send + Sync>;

/// Shared handle to the game session collection.
pub struct StoreHandle {
    /// Human-readable backend description for logs
    label: String,
    config: StoreConfig,
    opener: Arc<Opener>,
    backend: RwLock<Option<Arc<dyn RecordStore>>>,
    state: watch::Sender<ConnectionState>,
    /// Wakes the supervisor on connection loss or close
    wake: Notify,
}

impl StoreHandle {
    /// Connects to the store named by `target`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(target: StoreTarget, config: StoreConfig) -> Arc<Self> {
        let label = target.to_string();
        Self::connect_with(label, config, move || target.open().map(Arc::from))
    }

    /// Connects through a custom opener.
    pub fn connect_with<F>(label: impl Into<String>, config: StoreConfig, opener: F) -> Arc<Self>
    where
        F: Fn() -> StorageResult<Arc<dyn RecordStore>> + Send + Sync + 'static,
    {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        let handle = Arc::new(Self {
            label: label.into(),
            config,
            opener: Arc::new(Box::new(opener)),
            backend: RwLock::new(None),
            state,
            wake: Notify::new(),
        });

        tokio::spawn(Arc::clone(&handle).supervise());
        handle
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Waits until the handle is connected or `wait` elapses.
    pub async fn wait_connected(&self, wait: Duration) -> StorageResult<()> {
        self.acquire("connect", wait).await.map(|_| ())
    }

    pub async fn insert(&self, session: GameSession) -> StorageResult<StoredSession> {
        self.run("insert", move |store| store.insert(session)).await
    }

    pub async fn find_all(&self) -> StorageResult<Vec<StoredSession>> {
        self.run("find_all", |store| store.find_all()).await
    }

    pub async fn find_all_sorted(&self) -> StorageResult<Vec<StoredSession>> {
        self.run("find_all_sorted", |store| store.find_all_sorted())
            .await
    }

    pub async fn delete_all(&self) -> StorageResult<u64> {
        self.run("delete_all", |store| store.delete_all()).await
    }

    /// Closes the handle and the backend.
    ///
    /// Pending and later operations fail with `STORE_UNAVAILABLE`.
    pub async fn close(&self) -> StorageResult<()> {
        self.state.send_replace(ConnectionState::Closed);
        self.wake.notify_one();

        let backend = self.take_backend();
        info!(event = %Event::StoreClosed, store = %self.label, "store handle closed");

        match backend {
            Some(store) => tokio::task::spawn_blocking(move || store.close())
                .await
                .map_err(|e| StorageError::unavailable(format!("close task failed: {}", e)))?,
            None => Ok(()),
        }
    }

    /// Background loop: open, wait for loss, reopen.
    async fn supervise(self: Arc<Self>) {
        info!(event = %Event::StoreConnecting, store = %self.label, "connecting to store");

        loop {
            if self.state() == ConnectionState::Closed {
                return;
            }

            if self.current_backend().is_none() {
                let opener = Arc::clone(&self.opener);
                let opened = tokio::task::spawn_blocking(move || (*opener)())
                    .await
                    .unwrap_or_else(|e| {
                        Err(StorageError::unavailable(format!("open task failed: {}", e)))
                    });

                match opened {
                    Ok(store) => {
                        if let Ok(mut slot) = self.backend.write() {
                            *slot = Some(store);
                        }
                        if self.transition(ConnectionState::Connected) {
                            info!(event = %Event::StoreConnected, store = %self.label, "store connected");
                        } else if self.state() == ConnectionState::Closed {
                            // Closed while opening; release without serving.
                            self.take_backend();
                            return;
                        }
                    }
                    Err(e) => {
                        if e.is_fatal() {
                            error!(event = %Event::StoreCorruption, store = %self.label, error = %e, "store data is corrupted");
                        }
                        warn!(
                            event = %Event::StoreRetrying,
                            store = %self.label,
                            error = %e,
                            retry_in_ms = self.config.reconnect_delay.as_millis() as u64,
                            "store connection failed"
                        );
                        if self.state() != ConnectionState::Connecting {
                            self.transition(ConnectionState::Disconnected);
                        }
                        tokio::select! {
                            _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                            _ = self.wake.notified() => {}
                        }
                        continue;
                    }
                }
            }

            self.wake.notified().await;
        }
    }

    /// Sets the state unless the handle was closed meanwhile.
    fn transition(&self, next: ConnectionState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Closed || *state == next {
                false
            } else {
                *state = next;
                true
            }
        })
    }

    fn current_backend(&self) -> Option<Arc<dyn RecordStore>> {
        self.backend.read().ok().and_then(|slot| slot.clone())
    }

    fn take_backend(&self) -> Option<Arc<dyn RecordStore>> {
        self.backend.write().ok().and_then(|mut slot| slot.take())
    }

    fn mark_lost(&self, cause: &StorageError) {
        self.take_backend();
        if self.transition(ConnectionState::Disconnected) {
            warn!(event = %Event::StoreDisconnected, store = %self.label, error = %cause, "store connection lost");
        }
        self.wake.notify_one();
    }

    /// Waits up to `wait` for a connected backend.
    async fn acquire(
        &self,
        operation: &'static str,
        wait: Duration,
    ) -> StorageResult<Arc<dyn RecordStore>> {
        let deadline = Instant::now() + wait;
        let mut state = self.state.subscribe();

        loop {
            let current = *state.borrow_and_update();
            match current {
                ConnectionState::Closed => {
                    return Err(StorageError::unavailable("store handle is closed"));
                }
                ConnectionState::Connected => {
                    if let Some(store) = self.current_backend() {
                        return Ok(store);
                    }
                }
                ConnectionState::Connecting | ConnectionState::Disconnected => {}
            }

            match timeout_at(deadline, state.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => return Err(StorageError::unavailable("store handle dropped")),
                Err(_) => {
                    debug!(store = %self.label, operation, state = %current, "gave up waiting for store");
                    return Err(StorageError::timeout(operation, wait));
                }
            }
        }
    }

    /// Runs one backend call once a connection is available.
    ///
    /// Only the wait for a connection is bounded; the call itself is awaited
    /// to completion so its outcome is always the one reported.
    async fn run<T, F>(&self, operation: &'static str, call: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RecordStore) -> StorageResult<T> + Send + 'static,
    {
        let store = self.acquire(operation, self.config.operation_timeout).await?;

        let result = tokio::task::spawn_blocking(move || call(store.as_ref()))
            .await
            .unwrap_or_else(|e| {
                Err(StorageError::unavailable(format!(
                    "{} task failed: {}",
                    operation, e
                )))
            });

        match &result {
            Err(e) if e.is_connection_loss() => self.mark_lost(e),
            Err(e) if e.is_fatal() => {
                error!(event = %Event::StoreCorruption, store = %self.label, operation, error = %e, "store data is corrupted")
            }
            Err(e) => debug!(store = %self.label, operation, error = %e, "store operation failed"),
            Ok(_) => {}
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::MemoryStore;
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn fast_config() -> StoreConfig {
        StoreConfig {
            reconnect_delay: Duration::from_millis(20),
            operation_timeout: Duration::from_millis(500),
        }
    }

    fn session(stage: &str) -> GameSession {
        GameSession {
            stage_name: stage.to_string(),
            ..GameSession::default()
        }
    }

    /// Store whose next insert fails with an I/O error.
    struct FlakyStore {
        inner: MemoryStore,
        fail_next: AtomicBool,
    }

    impl RecordStore for FlakyStore {
        fn insert(&self, session: GameSession) -> StorageResult<StoredSession> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(StorageError::write_failed(
                    "disk went away",
                    io::Error::new(io::ErrorKind::Other, "disk went away"),
                ));
            }
            self.inner.insert(session)
        }

        fn find_all(&self) -> StorageResult<Vec<StoredSession>> {
            self.inner.find_all()
        }

        fn delete_all(&self) -> StorageResult<u64> {
            self.inner.delete_all()
        }
    }

    /// Store whose inserts outlast the connection wait.
    struct SlowStore {
        inner: MemoryStore,
        delay: Duration,
    }

    impl RecordStore for SlowStore {
        fn insert(&self, session: GameSession) -> StorageResult<StoredSession> {
            std::thread::sleep(self.delay);
            self.inner.insert(session)
        }

        fn find_all(&self) -> StorageResult<Vec<StoredSession>> {
            self.inner.find_all()
        }

        fn delete_all(&self) -> StorageResult<u64> {
            self.inner.delete_all()
        }
    }

    #[tokio::test]
    async fn test_slow_insert_reports_its_own_outcome() {
        let config = StoreConfig {
            reconnect_delay: Duration::from_millis(20),
            operation_timeout: Duration::from_millis(100),
        };
        let handle = StoreHandle::connect_with("slow", config, || {
            Ok(Arc::new(SlowStore {
                inner: MemoryStore::new(),
                delay: Duration::from_millis(300),
            }) as Arc<dyn RecordStore>)
        });
        handle.wait_connected(Duration::from_secs(1)).await.unwrap();

        let stored = handle.insert(session("stage1")).await.unwrap();
        assert_eq!(handle.find_all().await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_memory_handle_round_trip() {
        let handle = StoreHandle::connect(StoreTarget::Memory, fast_config());

        let stored = handle.insert(session("stage1")).await.unwrap();
        assert_eq!(handle.state(), ConnectionState::Connected);
        assert_eq!(handle.find_all().await.unwrap(), vec![stored]);
        assert_eq!(handle.delete_all().await.unwrap(), 1);
        assert!(handle.find_all_sorted().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_operations_fail_after_close() {
        let handle = StoreHandle::connect(StoreTarget::Memory, fast_config());
        handle.wait_connected(Duration::from_secs(1)).await.unwrap();

        handle.close().await.unwrap();
        assert_eq!(handle.state(), ConnectionState::Closed);

        let err = handle.find_all().await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_unreachable_store_times_out() {
        let handle = StoreHandle::connect_with("broken", fast_config(), || {
            Err(StorageError::unavailable("no backend"))
        });

        let err = handle.insert(session("stage1")).await.unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(err.code(), crate::storage::StorageErrorCode::StoreTimeout);
        assert_ne!(handle.state(), ConnectionState::Connected);
        handle.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_retries_until_backend_opens() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let handle = StoreHandle::connect_with("eventually", fast_config(), move || {
            if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(StorageError::unavailable("not yet"))
            } else {
                Ok(Arc::new(MemoryStore::new()) as Arc<dyn RecordStore>)
            }
        });

        handle.wait_connected(Duration::from_secs(2)).await.unwrap();
        assert!(attempts.load(Ordering::SeqCst) >= 4);
        handle.insert(session("stage1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_io_failure_triggers_reconnect() {
        let opens = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opens);

        let handle = StoreHandle::connect_with("flaky", fast_config(), move || {
            let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
            Ok(Arc::new(FlakyStore {
                inner: MemoryStore::new(),
                fail_next: AtomicBool::new(first),
            }) as Arc<dyn RecordStore>)
        });

        let err = handle.insert(session("stage1")).await.unwrap_err();
        assert!(err.is_connection_loss());

        // The next call waits for the reopened backend.
        handle.insert(session("stage1")).await.unwrap();
        assert_eq!(opens.load(Ordering::SeqCst), 2);
        assert_eq!(handle.state(), ConnectionState::Connected);
    }
}

//! Store Connection Lifecycle Tests
//!
//! - Requests made while the store is unreachable fail after the operation
//!   timeout instead of hanging
//! - The handle keeps retrying and connects once the backend appears
//! - Close is terminal

use std::fs;
use std::time::{Duration, Instant};

use gamedata::session::GameSession;
use gamedata::storage::{ConnectionState, StoreConfig, StoreHandle, StoreTarget};
use tempfile::TempDir;

fn fast_config() -> StoreConfig {
    StoreConfig {
        reconnect_delay: Duration::from_millis(25),
        operation_timeout: Duration::from_millis(200),
    }
}

#[tokio::test]
async fn test_unreachable_store_fails_within_timeout_then_recovers() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");

    // A plain file where the data directory should be blocks every open.
    fs::write(&data_dir, b"not a directory").unwrap();

    let store = StoreHandle::connect(StoreTarget::File(data_dir.clone()), fast_config());

    let started = Instant::now();
    let err = store.find_all().await.unwrap_err();
    assert!(err.is_unavailable(), "expected unavailable, got: {}", err);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_ne!(store.state(), ConnectionState::Connected);

    // Backend becomes reachable; the next attempt connects.
    fs::remove_file(&data_dir).unwrap();
    store.wait_connected(Duration::from_secs(2)).await.unwrap();
    assert_eq!(store.state(), ConnectionState::Connected);

    let stored = store.insert(GameSession::default()).await.unwrap();
    assert_eq!(store.find_all().await.unwrap(), vec![stored]);

    store.close().await.unwrap();
}

#[tokio::test]
async fn test_close_is_terminal() {
    let store = StoreHandle::connect(StoreTarget::Memory, fast_config());
    store.wait_connected(Duration::from_secs(1)).await.unwrap();

    store.close().await.unwrap();
    assert_eq!(store.state(), ConnectionState::Closed);
    assert!(store.insert(GameSession::default()).await.unwrap_err().is_unavailable());
    assert!(store
        .wait_connected(Duration::from_millis(50))
        .await
        .unwrap_err()
        .is_unavailable());
}

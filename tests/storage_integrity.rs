//! Storage Integrity Tests
//!
//! - Corruption is never ignored
//! - Reads never observe a half-written record
//! - Checksums on every record
//! - Clearing is durable
//!
//! The collection file is append-only and checksum-verified.

use std::fs::{self, OpenOptions};
use std::io::Write;

use gamedata::session::{GameSession, StoredSession};
use gamedata::storage::{
    DocumentRecord, FileStore, RecordStore, StorageReader, StorageWriter, COLLECTION_FILE,
};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn session(stage: &str, post_shock: bool) -> GameSession {
    GameSession {
        stage_name: stage.to_string(),
        user_id: "u1".to_string(),
        is_post_shock: post_shock,
        ..GameSession::default()
    }
}

fn create_temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

// =============================================================================
// Corruption Is Never Ignored
// =============================================================================

/// A flipped byte anywhere in a record must fail the read.
#[test]
fn test_corruption_causes_explicit_failure() {
    let temp_dir = create_temp_data_dir();
    let path = temp_dir.path().join(COLLECTION_FILE);

    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert(session("stage1", false)).unwrap();
    }

    let mut contents = fs::read(&path).unwrap();
    let mid = contents.len() / 2;
    contents[mid] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let err = StorageReader::open(&path)
        .unwrap()
        .read_sessions()
        .unwrap_err();
    assert!(err.is_fatal(), "corruption must be fatal, got: {}", err);
    assert!(
        err.to_string().to_lowercase().contains("checksum"),
        "error should mention checksum, got: {}",
        err
    );
}

/// A corrupted collection refuses to open instead of serving partial data.
#[test]
fn test_corrupted_collection_refuses_to_open() {
    let temp_dir = create_temp_data_dir();
    let path = temp_dir.path().join(COLLECTION_FILE);

    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert(session("stage1", false)).unwrap();
        store.insert(session("stage2", false)).unwrap();
    }

    let mut contents = fs::read(&path).unwrap();
    contents[12] ^= 0x01;
    fs::write(&path, contents).unwrap();

    assert!(FileStore::open(temp_dir.path()).is_err());
}

// =============================================================================
// Interrupted Appends
// =============================================================================

/// A torn final record is dropped on open; earlier records survive.
#[test]
fn test_torn_tail_repaired_on_open() {
    let temp_dir = create_temp_data_dir();
    let path = temp_dir.path().join(COLLECTION_FILE);

    let kept = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert(session("stage1", false)).unwrap()
    };

    // Half of a second record, as left by a crash mid-append.
    let partial = DocumentRecord::from_session(&StoredSession::assign(session("stage2", true)))
        .unwrap()
        .serialize();
    OpenOptions::new()
        .append(true)
        .open(&path)
        .unwrap()
        .write_all(&partial[..partial.len() / 2])
        .unwrap();

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.find_all().unwrap(), vec![kept.clone()]);

    let added = store.insert(session("stage3", false)).unwrap();
    assert_eq!(store.find_all().unwrap(), vec![kept, added]);
}

/// A partial record left behind by a failed append is cut off by the next
/// append through the same open store, so the file never becomes corrupt.
#[test]
fn test_append_over_partial_record_keeps_file_valid() {
    let temp_dir = create_temp_data_dir();
    let path = temp_dir.path().join(COLLECTION_FILE);

    let store = FileStore::open(temp_dir.path()).unwrap();
    let kept = store.insert(session("stage1", false)).unwrap();

    let partial = DocumentRecord::from_session(&StoredSession::assign(session("stage2", true)))
        .unwrap()
        .serialize();
    OpenOptions::new()
        .append(true)
        .open(&path)
        .unwrap()
        .write_all(&partial[..7])
        .unwrap();

    let added = store.insert(session("stage3", false)).unwrap();
    drop(store);

    let reopened = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(reopened.find_all().unwrap(), vec![kept, added]);
}

/// Every acknowledged record is readable after reopen, in order.
#[test]
fn test_acknowledged_records_survive_reopen() {
    let temp_dir = create_temp_data_dir();

    let stored: Vec<StoredSession> = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        (0..5)
            .map(|i| store.insert(session(&format!("stage{}", i), i % 2 == 0)).unwrap())
            .collect()
    };

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.find_all().unwrap(), stored);
}

// =============================================================================
// Checksums On Every Record
// =============================================================================

#[test]
fn test_every_record_checksummed() {
    let temp_dir = create_temp_data_dir();
    let path = temp_dir.path().join(COLLECTION_FILE);

    let mut offsets = Vec::new();
    {
        let mut writer = StorageWriter::open(&path).unwrap();
        for i in 0..3 {
            let stored = StoredSession::assign(session(&format!("stage{}", i), false));
            offsets.push(writer.write(&stored).unwrap());
        }
    }

    // Corrupt the last record only: the first two still read.
    let mut contents = fs::read(&path).unwrap();
    let last = offsets[2] as usize + 10;
    contents[last] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let mut reader = StorageReader::open(&path).unwrap();
    assert!(reader.read_next().unwrap().is_some());
    assert!(reader.read_next().unwrap().is_some());
    assert!(reader.read_next().unwrap_err().is_fatal());
}

// =============================================================================
// Delete-All
// =============================================================================

#[test]
fn test_clear_is_durable_and_idempotent() {
    let temp_dir = create_temp_data_dir();

    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert(session("stage1", true)).unwrap();
        store.insert(session("stage1", false)).unwrap();
        assert_eq!(store.delete_all().unwrap(), 2);
        assert_eq!(store.delete_all().unwrap(), 0);
    }

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert!(store.find_all().unwrap().is_empty());
    assert_eq!(
        fs::metadata(temp_dir.path().join(COLLECTION_FILE)).unwrap().len(),
        0
    );
}

#[test]
fn test_sorted_listing_from_disk() {
    let temp_dir = create_temp_data_dir();
    let store = FileStore::open(temp_dir.path()).unwrap();

    store.insert(session("stage1", true)).unwrap();
    store.insert(session("stage1", false)).unwrap();
    store.insert(session("stage0", true)).unwrap();

    let order: Vec<(String, bool)> = store
        .find_all_sorted()
        .unwrap()
        .into_iter()
        .map(|s| (s.session.stage_name, s.session.is_post_shock))
        .collect();
    assert_eq!(
        order,
        vec![
            ("stage0".to_string(), true),
            ("stage1".to_string(), false),
            ("stage1".to_string(), true),
        ]
    );
}

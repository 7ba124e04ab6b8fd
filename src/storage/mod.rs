//! Game session storage
//!
//! The durable backend is an append-only record file with no in-place
//! updates. An in-memory backend serves tests and throwaway deployments.
//!
//! # Design Principles
//!
//! - Append-only; clearing truncates the file
//! - Checksum-verified on every read
//! - Every acknowledged insert is fsynced
//! - An interrupted final append is repaired on open; any other damage
//!   refuses to open
//!
//! Handlers never touch a backend directly: they go through `StoreHandle`,
//! which owns connection state and reconnection.

mod connection;
mod errors;
mod reader;
mod record;
mod store;
mod writer;

pub use connection::{
    ConnectionState, StoreConfig, StoreHandle, DEFAULT_OPERATION_TIMEOUT,
    DEFAULT_RECONNECT_DELAY,
};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use reader::StorageReader;
pub use record::{compute_checksum, DocumentRecord};
pub use store::{FileStore, MemoryStore, RecordStore, StoreTarget, COLLECTION_FILE};
pub use writer::StorageWriter;

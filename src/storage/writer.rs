//! Record file writer with fsync enforcement
//!
//! - The file is append-only; records are never edited in place
//! - Every append is fsynced before it is acknowledged
//! - An interrupted final append found on open is cut off
//! - A failed append is rolled back to the last acknowledged record
//! - Clearing the collection truncates the file to zero length

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::errors::{StorageError, StorageResult};
use super::reader::StorageReader;
use super::record::DocumentRecord;
use crate::session::StoredSession;

/// Append-only writer for one collection file.
pub struct StorageWriter {
    /// Path to the storage file
    storage_path: PathBuf,
    /// Underlying file handle
    file: File,
    /// Current end-of-file offset
    current_offset: u64,
    /// Number of records in the file
    record_count: u64,
}

impl StorageWriter {
    /// Opens or creates the record file at `storage_path`.
    ///
    /// Creates parent directories if needed, validates every existing record
    /// and removes an incomplete final record left by an interrupted append.
    ///
    /// # Errors
    ///
    /// - `STORE_WRITE_FAILED` if the file cannot be created or opened
    /// - `STORE_DATA_CORRUPTION` if an existing record fails its checksum
    pub fn open(storage_path: &Path) -> StorageResult<Self> {
        if let Some(parent) = storage_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::write_failed(
                        format!("Failed to create data directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(storage_path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open storage file: {}", storage_path.display()),
                    e,
                )
            })?;

        let (valid_end, record_count) = Self::scan(storage_path)?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read file metadata", e))?
            .len();

        if valid_end < file_size {
            warn!(
                path = %storage_path.display(),
                offset = valid_end,
                discarded_bytes = file_size - valid_end,
                "discarding incomplete final record"
            );
            file.set_len(valid_end).map_err(|e| {
                StorageError::write_failed("Failed to truncate incomplete record", e)
            })?;
            file.sync_all()
                .map_err(|e| StorageError::write_failed("fsync failed after truncation", e))?;
        }

        Ok(Self {
            storage_path: storage_path.to_path_buf(),
            file,
            current_offset: valid_end,
            record_count,
        })
    }

    /// Validates every record and returns the end of the last complete record
    /// together with the record count.
    fn scan(storage_path: &Path) -> StorageResult<(u64, u64)> {
        let mut reader = StorageReader::open(storage_path)?;
        let mut count = 0;

        loop {
            match reader.read_next() {
                Ok(Some(_)) => count += 1,
                Ok(None) => break,
                Err(e) if e.is_truncated_record() => break,
                Err(e) => return Err(e),
            }
        }

        Ok((reader.current_offset(), count))
    }

    /// Returns the path to the storage file.
    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Returns the current file offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Returns the number of stored records.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Appends a stored session with fsync enforcement.
    ///
    /// Bytes past the last acknowledged record are discarded first, and a
    /// failed append is cut back off, so the file always ends on a complete
    /// record.
    ///
    /// Returns the byte offset where the record was written.
    ///
    /// # Errors
    ///
    /// Returns `STORE_WRITE_FAILED` if write or fsync fails.
    pub fn write(&mut self, session: &StoredSession) -> StorageResult<u64> {
        let record = DocumentRecord::from_session(session)?;
        let serialized = record.serialize();
        let offset = self.current_offset;

        self.discard_after(offset)?;

        if let Err(e) = self
            .file
            .write_all(&serialized)
            .and_then(|_| self.file.sync_all())
        {
            if let Err(rollback) = self.discard_after(offset) {
                warn!(
                    path = %self.storage_path.display(),
                    offset,
                    error = %rollback,
                    "failed to roll back interrupted append"
                );
            }
            return Err(StorageError::write_failed(
                format!("Failed to write document: {}", record.document_id),
                e,
            ));
        }

        self.current_offset += serialized.len() as u64;
        self.record_count += 1;

        Ok(offset)
    }

    /// Cuts the file back to `offset` if anything lies beyond it.
    fn discard_after(&self, offset: u64) -> StorageResult<()> {
        let len = self
            .file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read file metadata", e))?
            .len();

        if len > offset {
            warn!(
                path = %self.storage_path.display(),
                offset,
                discarded_bytes = len - offset,
                "discarding bytes past the last complete record"
            );
            self.file
                .set_len(offset)
                .map_err(|e| StorageError::write_failed("Failed to truncate partial record", e))?;
            self.file
                .sync_all()
                .map_err(|e| StorageError::write_failed("fsync failed after truncation", e))?;
        }
        Ok(())
    }

    /// Removes every record by truncating the file.
    ///
    /// Returns the number of records removed.
    pub fn truncate_all(&mut self) -> StorageResult<u64> {
        self.file
            .set_len(0)
            .map_err(|e| StorageError::write_failed("Failed to truncate storage file", e))?;
        self.file
            .sync_all()
            .map_err(|e| StorageError::write_failed("fsync failed after truncation", e))?;

        let removed = self.record_count;
        self.current_offset = 0;
        self.record_count = 0;
        Ok(removed)
    }

    /// Flushes file contents to disk.
    pub fn sync(&self) -> StorageResult<()> {
        self.file
            .sync_all()
            .map_err(|e| StorageError::io_error("fsync failed", e))
    }
}

//! Storage error types
//!
//! Error codes:
//! - STORE_IO_ERROR (ERROR severity)
//! - STORE_WRITE_FAILED (ERROR severity)
//! - STORE_READ_FAILED (ERROR severity)
//! - STORE_DATA_CORRUPTION (FATAL severity)
//! - STORE_TRUNCATED_RECORD (ERROR severity)
//! - STORE_UNAVAILABLE (ERROR severity)
//! - STORE_TIMEOUT (ERROR severity)

use std::fmt;
use std::io;
use std::time::Duration;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// The backing file cannot be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure outside a read or write
    StoreIoError,
    /// Document write failed
    StoreWriteFailed,
    /// Document read failed
    StoreReadFailed,
    /// Data checksum failure
    StoreDataCorruption,
    /// Final record shorter than its declared length (interrupted append)
    StoreTruncatedRecord,
    /// No backend connected, or the handle is closed
    StoreUnavailable,
    /// Operation exceeded its deadline
    StoreTimeout,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::StoreIoError => "STORE_IO_ERROR",
            StorageErrorCode::StoreWriteFailed => "STORE_WRITE_FAILED",
            StorageErrorCode::StoreReadFailed => "STORE_READ_FAILED",
            StorageErrorCode::StoreDataCorruption => "STORE_DATA_CORRUPTION",
            StorageErrorCode::StoreTruncatedRecord => "STORE_TRUNCATED_RECORD",
            StorageErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
            StorageErrorCode::StoreTimeout => "STORE_TIMEOUT",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::StoreDataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with full context
#[derive(Debug)]
pub struct StorageError {
    /// Error code
    code: StorageErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StorageError {
    fn with_code(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new storage I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::with_code(StorageErrorCode::StoreIoError, message)
        }
    }

    /// Create a new storage write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::with_code(StorageErrorCode::StoreWriteFailed, message)
        }
    }

    /// Create a storage write failed error without IO source
    pub fn write_failed_no_source(message: impl Into<String>) -> Self {
        Self::with_code(StorageErrorCode::StoreWriteFailed, message)
    }

    /// Create a new storage read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::with_code(StorageErrorCode::StoreReadFailed, message)
        }
    }

    /// Create a new data corruption error (FATAL)
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self::with_code(StorageErrorCode::StoreDataCorruption, message)
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::data_corruption(reason)
        }
    }

    /// Create a data corruption error with document ID context
    pub fn corruption_for_document(document_id: &str, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("document_id: {}", document_id)),
            ..Self::data_corruption(reason)
        }
    }

    /// Create a truncated-record error for an append cut short at `offset`
    pub fn truncated_record(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::with_code(StorageErrorCode::StoreTruncatedRecord, reason)
        }
    }

    /// Create an unavailable error (not connected, or closed)
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_code(StorageErrorCode::StoreUnavailable, message)
    }

    /// Create a timeout error for an operation that never got a connection
    pub fn timeout(operation: &str, after: Duration) -> Self {
        Self {
            details: Some(format!("timeout_ms: {}", after.as_millis())),
            ..Self::with_code(
                StorageErrorCode::StoreTimeout,
                format!("{} timed out waiting for a store connection", operation),
            )
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal for the backing file
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns whether this error marks an interrupted final append
    pub fn is_truncated_record(&self) -> bool {
        self.code == StorageErrorCode::StoreTruncatedRecord
    }

    /// Returns whether the store could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self.code,
            StorageErrorCode::StoreUnavailable | StorageErrorCode::StoreTimeout
        )
    }

    /// Returns whether the backend connection should be considered lost.
    ///
    /// Any failure carrying an I/O source means the file handle can no
    /// longer be trusted and must be reopened.
    pub fn is_connection_loss(&self) -> bool {
        self.source.is_some()
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

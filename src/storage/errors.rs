//! Storage error types.
//!
//! Error codes:
//! - SUBRA_STORAGE_NOT_FOUND (referenced document id absent)
//! - SUBRA_STORAGE_CORRUPTED (stored table value present but undecodable)
//! - SUBRA_STORAGE_WRITE_FAILED
//! - SUBRA_STORAGE_READ_FAILED
//! - SUBRA_STORAGE_CAPACITY_EXCEEDED

use std::fmt;
use std::io;

/// Storage failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// Referenced document id absent on update/delete
    NotFound,
    /// Stored table value present but undecodable
    Corruption,
    /// Medium rejected a write
    WriteFailed,
    /// Medium rejected a read
    ReadFailed,
    /// Medium capacity exhausted
    CapacityExceeded,
}

impl StorageErrorKind {
    /// Returns the string code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorKind::NotFound => "SUBRA_STORAGE_NOT_FOUND",
            StorageErrorKind::Corruption => "SUBRA_STORAGE_CORRUPTED",
            StorageErrorKind::WriteFailed => "SUBRA_STORAGE_WRITE_FAILED",
            StorageErrorKind::ReadFailed => "SUBRA_STORAGE_READ_FAILED",
            StorageErrorKind::CapacityExceeded => "SUBRA_STORAGE_CAPACITY_EXCEEDED",
        }
    }
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Persistence failure with full context.
///
/// Failed operations never commit a partial write; the persisted table list
/// is exactly as it was before the call. Errors are never retried
/// internally; retry policy belongs to the caller.
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    message: String,
    source: Option<io::Error>,
}

impl StorageError {
    /// Referenced document id absent on update/delete.
    pub fn not_found(table: &str, id: &str) -> Self {
        Self {
            kind: StorageErrorKind::NotFound,
            message: format!("document '{}' not found in table '{}'", id, table),
            source: None,
        }
    }

    /// Stored table value present but undecodable.
    pub fn corrupted_table(table: &str, reason: impl Into<String>) -> Self {
        Self {
            kind: StorageErrorKind::Corruption,
            message: format!("table '{}' holds an undecodable value: {}", table, reason.into()),
            source: None,
        }
    }

    /// Medium rejected a write.
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            kind: StorageErrorKind::WriteFailed,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Medium rejected a write, no underlying I/O error.
    pub fn write_failed_no_source(message: impl Into<String>) -> Self {
        Self {
            kind: StorageErrorKind::WriteFailed,
            message: message.into(),
            source: None,
        }
    }

    /// Medium rejected a read.
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            kind: StorageErrorKind::ReadFailed,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Medium capacity exhausted.
    pub fn capacity_exceeded(message: impl Into<String>) -> Self {
        Self {
            kind: StorageErrorKind::CapacityExceeded,
            message: message.into(),
            source: None,
        }
    }

    /// Returns the failure kind.
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this is the distinguished not-found variant.
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

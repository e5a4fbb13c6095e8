//! Facade error type.

use thiserror::Error;

use crate::schema::ValidationError;
use crate::storage::StorageError;

/// Result type for facade operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors surfaced by the database facade.
///
/// `UnknownTable` is a configuration error raised when requesting a handle
/// for a table the schema never declared; it is distinct from every runtime
/// data error.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Handle requested for a table the schema does not declare
    #[error("table '{0}' is not declared in the database schema")]
    UnknownTable(String),

    /// Insert payload or update patch violates the table's contract
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persistence failure, including the not-found variant
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DatabaseError {
    /// Whether this wraps the distinguished not-found storage error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::Storage(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_table_message() {
        let err = DatabaseError::UnknownTable("users".into());
        assert_eq!(
            err.to_string(),
            "table 'users' is not declared in the database schema"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_passes_through() {
        let err: DatabaseError = StorageError::not_found("subscriptions", "abc").into();
        assert!(err.is_not_found());
    }
}

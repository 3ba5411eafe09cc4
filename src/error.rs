//! Error types for myorm

use thiserror::Error;

/// Result type alias for myorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Session (re)establishment error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution error
    #[error("Query error: {0}")]
    Query(#[from] mysql_async::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A single-row read matched more than one row
    #[error("Too many rows: expected {expected}, got {got}")]
    TooManyRows { expected: usize, got: usize },

    /// A clause that requires at least one field got none
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Page number or page size below 1 in a page slice
    #[error("Invalid page slice: page {page}, size {size} (both must be >= 1)")]
    InvalidPage { page: u64, size: u64 },

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Builder misconfiguration
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a too-many-rows error
    pub fn too_many_rows(expected: usize, got: usize) -> Self {
        Self::TooManyRows { expected, got }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a too-many-rows error
    pub fn is_too_many_rows(&self) -> bool {
        matches!(self, Self::TooManyRows { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_match_their_variants() {
        assert!(OrmError::not_found("no such user").is_not_found());
        assert!(OrmError::too_many_rows(1, 3).is_too_many_rows());
        assert!(!OrmError::validation("x").is_not_found());
        assert!(!OrmError::not_found("x").is_too_many_rows());
    }
}

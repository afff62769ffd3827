//! Error types for capsearch-rs
//!
//! This module provides error handling for all caption store, index, and
//! query operations.

use thiserror::Error;

/// Main error type for capsearch operations
#[derive(Error, Debug)]
pub enum CapsearchError {
    /// A video with this id already exists
    #[error("Duplicate video id: {0}")]
    DuplicateId(String),

    /// A caption references a video id that does not exist
    #[error("Caption references unknown video id: {0}")]
    DanglingReference(String),

    /// The search expression could not be parsed by the index
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    /// Database/storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Timed-text caption track parsing errors
    #[error("Timed-text parse error: {0}")]
    TimedText(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for capsearch operations
pub type Result<T> = std::result::Result<T, CapsearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CapsearchError::DuplicateId("v1".to_string());
        assert_eq!(error.to_string(), "Duplicate video id: v1");

        let error = CapsearchError::InvalidQuery("***".to_string());
        assert_eq!(error.to_string(), "Invalid search query: ***");
    }

    #[test]
    fn test_error_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = CapsearchError::from(io_error);

        match error {
            CapsearchError::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }
}

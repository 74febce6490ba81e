//! Journal store error types.

use thiserror::Error;

/// Errors that can occur during journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Entry file does not exist.
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Filename would escape the journal directory.
    #[error("Invalid entry filename: {0}")]
    InvalidFilename(String),

    /// Update carried no content.
    #[error("No content provided")]
    EmptyContent,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl JournalError {
    pub fn not_found(filename: impl Into<String>) -> Self {
        Self::NotFound(filename.into())
    }

    pub fn invalid_filename(filename: impl Into<String>) -> Self {
        Self::InvalidFilename(filename.into())
    }
}

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;

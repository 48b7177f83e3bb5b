//! Error types for the roster core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur on the editing path.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Durable store error.
    #[error("storage error: {0}")]
    Storage(#[from] roster_storage::StorageError),

    /// The edit was rejected before anything was written.
    #[error("invalid edit: {message}")]
    InvalidEdit {
        /// Why the edit was rejected.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid edit error.
    pub fn invalid_edit(message: impl Into<String>) -> Self {
        Self::InvalidEdit {
            message: message.into(),
        }
    }
}

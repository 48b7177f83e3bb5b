//! Error types for the sync engine.

use roster_storage::PersonId;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Durable store error during sync.
    #[error("storage error: {0}")]
    Storage(#[from] roster_storage::StorageError),

    /// Network or transport error.
    #[error("network error: {message}")]
    Network {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The endpoint answered with a non-success HTTP status.
    #[error("request failed with status {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
    },

    /// Response body missing expected fields or not decodable.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Sync is not configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Not connected to the network.
    #[error("no network connection")]
    NotConnected,

    /// Identity is not on the allow-list.
    #[error("identity {0} is not authorized")]
    NotAuthorized(PersonId),

    /// Identity is absent from the full dataset.
    #[error("identity {0} not found in dataset")]
    UnknownIdentity(PersonId),
}

impl SyncError {
    /// Creates a retryable network error.
    pub fn network_retryable(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable network error.
    pub fn network_fatal(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if a later attempt may succeed without intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Network { retryable, .. } => *retryable,
            SyncError::HttpStatus { status } => *status >= 500 || *status == 429,
            SyncError::NotConnected => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::HttpStatus {
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return Self::Protocol(err.to_string());
        }
        if err.is_builder() {
            return Self::Configuration(err.to_string());
        }
        Self::network_retryable(err.to_string())
    }
}

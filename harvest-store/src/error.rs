//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or refusing requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Record not found.
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

//! Error types for the vector database

use thiserror::Error;

/// Result type alias for VectorDB operations
pub type Result<T> = std::result::Result<T, VectorDbError>;

/// Error types that can occur in VectorDB operations
#[derive(Error, Debug)]
pub enum VectorDbError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector: {reason}")]
    InvalidVector { reason: String },

    #[error("Entries not sorted by id: entry {index} is not greater than its predecessor")]
    UnsortedEntries { index: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for VectorDbError {
    fn from(err: serde_json::Error) -> Self {
        VectorDbError::SerializationError(err.to_string())
    }
}

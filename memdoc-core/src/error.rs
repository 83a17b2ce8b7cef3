//! Error types and result types for document store operations.
//!
//! Lookup misses are not errors: `find_one` reports them as `Ok(None)` and
//! `update_one` as a zero modified count. Errors are reserved for contract
//! violations such as a missing identity field or a malformed operator.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The document has an invalid structure, e.g. it lacks the identity field.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The query document is malformed or uses an operator the store rejects.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// The update document is malformed or cannot be applied to the target document.
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),
    /// A pipeline stage is malformed or unsupported.
    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

use thiserror::Error;

use crate::{DocumentId, Version};

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// The requested document does not exist.
    #[error("Document {id} not found in collection {collection}")]
    NotFound { collection: String, id: DocumentId },

    /// A document with the caller-supplied ID already exists.
    #[error("Document {id} already exists in collection {collection}")]
    AlreadyExists { collection: String, id: DocumentId },

    /// A conditional update found the document at a different version.
    #[error(
        "Version conflict for {collection}/{id}: expected version {expected}, found {actual}"
    )]
    VersionConflict {
        collection: String,
        id: DocumentId,
        expected: Version,
        actual: Version,
    },

    /// The fields given for a write were not a JSON object.
    #[error("Invalid document fields: {0}")]
    InvalidFields(String),

    /// The store could not be reached or rejected the call.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocumentStoreError {
    /// Returns true if this error is a failed optimistic concurrency check.
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, DocumentStoreError::VersionConflict { .. })
    }

    /// Returns true if this error means the document does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentStoreError::NotFound { .. })
    }
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, DocumentStoreError>;

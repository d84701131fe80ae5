//! Error types for storage collaborators.

use thiserror::Error;
use uuid::Uuid;

/// Structured error types for snapshot, operation-log, and access-control
/// storage operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced document does not exist in the store
    #[error("document not found: {doc_id}")]
    DocumentNotFound { doc_id: Uuid },

    /// A snapshot write failed
    #[error("snapshot write failed for document {doc_id}: {reason}")]
    SnapshotWriteFailed { doc_id: Uuid, reason: String },

    /// An operation-log append failed
    #[error("operation log append failed for document {doc_id}: {reason}")]
    LogAppendFailed { doc_id: Uuid, reason: String },

    /// The underlying store is unreachable or corrupted
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Check if this error indicates a missing document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::DocumentNotFound { .. })
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}

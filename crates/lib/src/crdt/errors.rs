//! Error types for CRDT operations.
//!
//! This module defines structured error types specific to the replicated
//! document engine: position allocation failures, unknown character
//! references, and snapshot encoding issues.

use thiserror::Error;
use uuid::Uuid;

/// Structured error types for CRDT operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CRDTError {
    /// A character id referenced by an operation does not exist in the replica
    #[error("character not found: {id}")]
    CharacterNotFound { id: Uuid },

    /// Position allocation descended past the maximum permitted path depth
    #[error("position path depth exceeded {max} digits")]
    PathDepthExceeded { max: usize },

    /// Serialization of replica state failed
    #[error("replica serialization failed: {reason}")]
    SerializationFailed { reason: String },

    /// Deserialization of replica state failed
    #[error("replica deserialization failed: {reason}")]
    DeserializationFailed { reason: String },
}

impl CRDTError {
    /// Check if this error is related to character lookup
    pub fn is_not_found_error(&self) -> bool {
        matches!(self, CRDTError::CharacterNotFound { .. })
    }

    /// Check if this error is related to snapshot encoding
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            CRDTError::SerializationFailed { .. } | CRDTError::DeserializationFailed { .. }
        )
    }
}

// Conversion from CRDTError to the main Error type
impl From<CRDTError> for crate::Error {
    fn from(err: CRDTError) -> Self {
        crate::Error::CRDT(err)
    }
}

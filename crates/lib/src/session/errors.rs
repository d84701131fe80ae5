//! Error types for the live session layer.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while opening or servicing a document session.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// The connecting user may not open the document.
    #[error("user {user_id} has no access to document {doc_id}")]
    AccessDenied { user_id: Uuid, doc_id: Uuid },

    /// The document does not exist.
    #[error("document not found: {doc_id}")]
    DocumentNotFound { doc_id: Uuid },

    /// An inbound payload did not match any known message type.
    #[error("malformed message: {reason}")]
    MalformedMessage { reason: String },

    /// An outbound frame could not be encoded.
    #[error("failed to encode outbound frame: {reason}")]
    EncodeFailed { reason: String },
}

impl SessionError {
    /// Check if this error refused access to a document.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, SessionError::AccessDenied { .. })
    }

    /// Check if this error indicates a missing document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::DocumentNotFound { .. })
    }
}

// Conversion from SessionError to the main Error type
impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}

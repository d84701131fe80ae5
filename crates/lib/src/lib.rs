//!
//! Cotext: the core of a real-time collaborative plain-text editor.
//! This library provides the replicated document engine and the live session
//! layer that relays edits between connected clients.
//!
//! ## Core Concepts
//!
//! * **Positions (`crdt::Position`)**: Densely-orderable identifiers assigned to each
//!   character, so a new character can always be placed strictly between two existing ones.
//! * **Replicas (`crdt::Replica`)**: Per-document CRDT state mapping character ids to
//!   characters. Concurrent inserts and deletes commute and merge deterministically.
//! * **Document cache (`cache::DocCache`)**: Process-wide map from document id to its live
//!   replica, lazily bootstrapped from a durable snapshot.
//! * **Stores (`store`)**: Pluggable collaborators for snapshots, the operation log, and
//!   access control.
//! * **Sessions (`session`)**: Per-document connection registry, presence, and the
//!   broadcast engine that fans edits out over WebSocket connections.

pub mod cache;
pub mod constants;
pub mod crdt;
pub mod session;
pub mod store;

/// Re-export the `Replica` struct for easier access.
pub use crdt::Replica;

/// Result type used throughout the Cotext library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Cotext library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured CRDT errors from the crdt module
    #[error(transparent)]
    CRDT(crdt::CRDTError),

    /// Structured storage errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured session errors from the session module
    #[error(transparent)]
    Session(session::SessionError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::CRDT(_) => "crdt",
            Error::Store(_) => "store",
            Error::Session(_) => "session",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::CRDT(crdt_err) => crdt_err.is_not_found_error(),
            Error::Store(store_err) => store_err.is_not_found(),
            Error::Session(session_err) => session_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_access_denied(),
            _ => false,
        }
    }
}

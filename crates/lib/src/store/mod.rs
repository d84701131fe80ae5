//! Storage collaborator interfaces.
//!
//! The session layer talks to durable storage and access control only
//! through the traits defined here, keeping the real-time path independent
//! of the specific persistence mechanism. Persistence is best-effort by
//! design: a failed snapshot or log write is logged and never rolls back the
//! in-memory state or blocks the relay.

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;
use crate::crdt::CrdtOp;

pub mod errors;
pub mod in_memory;

pub use errors::StoreError;
pub use in_memory::{InMemoryStore, LinkAccessRole};

/// Outcome of an access check for a (user, document) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The user may open the document.
    Granted,
    /// The document exists but the user has no access to it.
    Forbidden,
    /// The document does not exist.
    NotFound,
}

/// Durable snapshot storage for serialized replica state.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Fetch the latest snapshot for a document, if one was ever written.
    async fn load(&self, doc_id: Uuid) -> Result<Option<String>>;

    /// Overwrite the snapshot for a document.
    async fn save(&self, doc_id: Uuid, snapshot: String) -> Result<()>;
}

/// Durable, append-ordered log of edit operations per document.
#[async_trait]
pub trait OperationLog: Send + Sync {
    /// Append an operation. Fire-and-forget from the caller's perspective.
    async fn append(&self, doc_id: Uuid, op: CrdtOp) -> Result<()>;

    /// All operations for a document, ordered by append time.
    async fn list_ordered(&self, doc_id: Uuid) -> Result<Vec<CrdtOp>>;
}

/// Access control decisions for document sessions.
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Decide whether `user_id` may open `doc_id`.
    async fn check_access(&self, user_id: Uuid, doc_id: Uuid) -> Result<AccessDecision>;
}

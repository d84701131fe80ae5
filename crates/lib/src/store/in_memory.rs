//! In-memory implementations of the storage collaborators.
//!
//! Suitable for tests, development, and single-process deployments. All
//! three collaborator traits are implemented by one [`InMemoryStore`] so a
//! server can be wired up from a single value.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AccessControl, AccessDecision, OperationLog, SnapshotStore};
use crate::Result;
use crate::crdt::CrdtOp;

/// Role granted to anyone holding a link to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAccessRole {
    View,
    Edit,
}

/// Who may open a document: its owner, explicit members, or anyone when a
/// link role is set.
#[derive(Debug, Clone)]
struct DocumentAccess {
    owner: Uuid,
    members: HashSet<Uuid>,
    link_access: Option<LinkAccessRole>,
}

/// An appended operation together with its append timestamp.
#[derive(Debug, Clone)]
struct LoggedOp {
    op: CrdtOp,
    created_at: DateTime<Utc>,
}

/// In-memory snapshot store, operation log, and access registry.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    snapshots: RwLock<HashMap<Uuid, String>>,
    ops: RwLock<HashMap<Uuid, Vec<LoggedOp>>>,
    documents: RwLock<HashMap<Uuid, DocumentAccess>>,
    /// When set, unknown documents are open to any user. Used by the server
    /// binary, which has no membership CRUD layer in front of it.
    permissive: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that grants access to any (user, document) pair it has no
    /// record of.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Register a document with an owner. Returns the new document id.
    pub fn create_document(&self, owner: Uuid) -> Uuid {
        let doc_id = Uuid::new_v4();
        self.documents.write().unwrap().insert(
            doc_id,
            DocumentAccess {
                owner,
                members: HashSet::new(),
                link_access: None,
            },
        );
        doc_id
    }

    /// Grant an explicit member access to a document.
    pub fn add_member(&self, doc_id: Uuid, user_id: Uuid) {
        if let Some(access) = self.documents.write().unwrap().get_mut(&doc_id) {
            access.members.insert(user_id);
        }
    }

    /// Set or clear the link-based access role of a document.
    pub fn set_link_access(&self, doc_id: Uuid, role: Option<LinkAccessRole>) {
        if let Some(access) = self.documents.write().unwrap().get_mut(&doc_id) {
            access.link_access = role;
        }
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn load(&self, doc_id: Uuid) -> Result<Option<String>> {
        Ok(self.snapshots.read().unwrap().get(&doc_id).cloned())
    }

    async fn save(&self, doc_id: Uuid, snapshot: String) -> Result<()> {
        self.snapshots.write().unwrap().insert(doc_id, snapshot);
        Ok(())
    }
}

#[async_trait]
impl OperationLog for InMemoryStore {
    async fn append(&self, doc_id: Uuid, op: CrdtOp) -> Result<()> {
        self.ops.write().unwrap().entry(doc_id).or_default().push(LoggedOp {
            op,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_ordered(&self, doc_id: Uuid) -> Result<Vec<CrdtOp>> {
        let ops = self.ops.read().unwrap();
        let mut logged: Vec<LoggedOp> = ops.get(&doc_id).cloned().unwrap_or_default();
        logged.sort_by_key(|l| l.created_at);
        Ok(logged.into_iter().map(|l| l.op).collect())
    }
}

#[async_trait]
impl AccessControl for InMemoryStore {
    async fn check_access(&self, user_id: Uuid, doc_id: Uuid) -> Result<AccessDecision> {
        let documents = self.documents.read().unwrap();
        let Some(access) = documents.get(&doc_id) else {
            return Ok(if self.permissive {
                AccessDecision::Granted
            } else {
                AccessDecision::NotFound
            });
        };

        let granted = access.owner == user_id
            || access.members.contains(&user_id)
            || access.link_access.is_some();
        Ok(if granted {
            AccessDecision::Granted
        } else {
            AccessDecision::Forbidden
        })
    }
}

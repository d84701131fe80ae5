//! Per-document registry of live connections.
//!
//! The registry tracks, for each document, the set of open connections and a
//! map from user id to their current connection. Delivery goes through each
//! connection's unbounded outbound channel, so broadcasting never blocks on
//! a slow peer; a send into a closed channel is logged and skipped.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier for one live connection.
pub type ConnectionId = Uuid;

/// Sending half of a live connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub user_id: Uuid,
    sender: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    /// Create a handle plus the receiver its socket task drains.
    pub fn channel(user_id: Uuid) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                user_id,
                sender,
            },
            receiver,
        )
    }

    /// Queue a frame for this connection. Returns false if the connection's
    /// receiver is gone.
    pub fn send(&self, frame: impl Into<String>) -> bool {
        self.sender.send(frame.into()).is_ok()
    }
}

#[derive(Debug, Default)]
struct DocSessions {
    connections: HashMap<ConnectionId, ConnectionHandle>,
    users: HashMap<Uuid, ConnectionId>,
}

/// What a deregistration actually removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    pub removed_connection: bool,
    pub removed_user: bool,
}

/// Registry of live connections, keyed by document.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    docs: RwLock<HashMap<Uuid, DocSessions>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection on a document and return the user ids currently
    /// present, the new arrival included.
    ///
    /// A second registration for the same user overwrites the user-map entry
    /// without closing the prior connection.
    pub fn register(&self, doc_id: Uuid, handle: ConnectionHandle) -> Vec<Uuid> {
        let mut docs = self.docs.write().unwrap();
        let sessions = docs.entry(doc_id).or_default();
        sessions.users.insert(handle.user_id, handle.id);
        sessions.connections.insert(handle.id, handle);
        sessions.users.keys().copied().collect()
    }

    /// Remove a connection. Idempotent: a repeated removal reports nothing
    /// removed and must trigger no further presence broadcast.
    ///
    /// The user-map entry is removed unconditionally, matching the overwrite
    /// behavior on double registration.
    pub fn remove(&self, doc_id: Uuid, conn_id: ConnectionId, user_id: Uuid) -> Departure {
        let mut docs = self.docs.write().unwrap();
        let Some(sessions) = docs.get_mut(&doc_id) else {
            return Departure {
                removed_connection: false,
                removed_user: false,
            };
        };
        let removed_connection = sessions.connections.remove(&conn_id).is_some();
        let removed_user = removed_connection && sessions.users.remove(&user_id).is_some();
        Departure {
            removed_connection,
            removed_user,
        }
    }

    /// Relay a frame to every live connection on a document except the
    /// sender's. Per-target failures are logged and skipped.
    pub fn broadcast(&self, doc_id: Uuid, exclude: ConnectionId, frame: &str) {
        let docs = self.docs.read().unwrap();
        let Some(sessions) = docs.get(&doc_id) else {
            return;
        };
        for handle in sessions.connections.values() {
            if handle.id == exclude {
                continue;
            }
            if !handle.send(frame) {
                warn!(%doc_id, connection = %handle.id, "dropping frame for closed connection");
            }
        }
    }

    /// Deliver a presence frame to every tracked user on a document except
    /// `exclude_user`.
    pub fn broadcast_presence(&self, doc_id: Uuid, exclude_user: Uuid, frame: &str) {
        let docs = self.docs.read().unwrap();
        let Some(sessions) = docs.get(&doc_id) else {
            return;
        };
        for (user_id, conn_id) in &sessions.users {
            if *user_id == exclude_user {
                continue;
            }
            match sessions.connections.get(conn_id) {
                Some(handle) => {
                    if !handle.send(frame) {
                        warn!(%doc_id, user = %user_id, "dropping presence frame for closed connection");
                    }
                }
                None => debug!(%doc_id, user = %user_id, "user maps to an unregistered connection"),
            }
        }
    }

    /// Number of live connections on a document.
    pub fn connection_count(&self, doc_id: Uuid) -> usize {
        self.docs
            .read()
            .unwrap()
            .get(&doc_id)
            .map(|s| s.connections.len())
            .unwrap_or(0)
    }

    /// User ids currently tracked on a document.
    pub fn user_ids(&self, doc_id: Uuid) -> Vec<Uuid> {
        self.docs
            .read()
            .unwrap()
            .get(&doc_id)
            .map(|s| s.users.keys().copied().collect())
            .unwrap_or_default()
    }
}

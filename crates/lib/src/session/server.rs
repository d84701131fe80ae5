//! Composition root for the collaboration service.
//!
//! [`CollabServer`] owns the document cache, the session registry, and the
//! storage collaborators, and exposes the WebSocket endpoint as an axum
//! router so a binary can mount it and serve.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State, WebSocketUpgrade},
    response::Response,
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use super::handler;
use super::registry::SessionRegistry;
use crate::cache::DocCache;
use crate::store::{AccessControl, InMemoryStore, OperationLog, SnapshotStore};

/// The live collaboration service for all documents in this process.
pub struct CollabServer {
    cache: DocCache,
    registry: SessionRegistry,
    ops: Arc<dyn OperationLog>,
    access: Arc<dyn AccessControl>,
}

impl CollabServer {
    pub fn new(
        snapshots: Arc<dyn SnapshotStore>,
        ops: Arc<dyn OperationLog>,
        access: Arc<dyn AccessControl>,
    ) -> Self {
        Self {
            cache: DocCache::new(snapshots),
            registry: SessionRegistry::new(),
            ops,
            access,
        }
    }

    /// Wire all three collaborator roles to one in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self::new(store.clone(), store.clone(), store)
    }

    pub fn cache(&self) -> &DocCache {
        &self.cache
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub(crate) fn ops(&self) -> &Arc<dyn OperationLog> {
        &self.ops
    }

    pub(crate) fn access(&self) -> &Arc<dyn AccessControl> {
        &self.access
    }

    /// Build the router exposing the document WebSocket endpoint.
    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/ws/docs/{doc_id}", get(connect))
            .with_state(self.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ConnectParams {
    /// Externally-established principal opening the session.
    user: Uuid,
}

/// Handshake for `GET /ws/docs/{doc_id}?user={user_id}`.
async fn connect(
    State(server): State<Arc<CollabServer>>,
    Path(doc_id): Path<Uuid>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handler::run_connection(server, socket, doc_id, params.user))
}

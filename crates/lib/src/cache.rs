//! Process-wide cache of live document replicas.
//!
//! Each document's [`Replica`] sits behind its own async mutex, so all
//! mutation, clock movement and position allocation for one document are
//! serialized while distinct documents proceed in parallel. Replicas are
//! loaded lazily from the snapshot store on first access and stay cached for
//! the lifetime of the process; idle eviction is intentionally not
//! implemented.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::Result;
use crate::crdt::{CrdtOp, Replica};
use crate::store::SnapshotStore;

/// Cache mapping document id to its live replica.
pub struct DocCache {
    snapshots: Arc<dyn SnapshotStore>,
    docs: RwLock<HashMap<Uuid, Arc<Mutex<Replica>>>>,
}

impl DocCache {
    pub fn new(snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self {
            snapshots,
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the cached replica for a document, loading it from the snapshot
    /// store (or creating it empty) on first access.
    ///
    /// A fresh replica uses the document id as its site id, which is the
    /// server-side replica's identity for position tie-breaks.
    pub async fn get_or_load(&self, doc_id: Uuid) -> Result<Arc<Mutex<Replica>>> {
        if let Some(replica) = self.docs.read().await.get(&doc_id) {
            return Ok(replica.clone());
        }

        let replica = match self.snapshots.load(doc_id).await? {
            Some(snapshot) => Replica::from_snapshot(&snapshot).map_err(crate::Error::CRDT)?,
            None => {
                debug!(%doc_id, "no snapshot found, starting empty replica");
                Replica::new(doc_id.to_string())
            }
        };

        // Two handlers can race the load; the first insert wins.
        let mut docs = self.docs.write().await;
        let entry = docs
            .entry(doc_id)
            .or_insert_with(|| Arc::new(Mutex::new(replica)));
        Ok(entry.clone())
    }

    /// Apply an edit operation to a document and write back the new snapshot.
    ///
    /// The snapshot write is best-effort: a failure is logged and the
    /// in-memory application stands.
    pub async fn apply(&self, doc_id: Uuid, op: &CrdtOp) -> Result<()> {
        let replica = self.get_or_load(doc_id).await?;
        let snapshot = {
            let mut replica = replica.lock().await;
            replica.apply(op);
            replica.to_snapshot().map_err(crate::Error::CRDT)?
        };

        if let Err(e) = self.snapshots.save(doc_id, snapshot).await {
            warn!(%doc_id, error = %e, "snapshot write failed, in-memory state retained");
        }
        Ok(())
    }

    /// Current text of a document.
    pub async fn text(&self, doc_id: Uuid) -> Result<String> {
        let replica = self.get_or_load(doc_id).await?;
        let replica = replica.lock().await;
        Ok(replica.extract_text())
    }
}

use std::sync::Arc;

use cotext::crdt::{CrdtOp, Replica};
use cotext::session::CollabServer;
use cotext::store::InMemoryStore;
use uuid::Uuid;

/// Append `text` to the replica one character at a time, returning the
/// inserted character ids in document order.
pub fn append_text(replica: &mut Replica, text: &str) -> Vec<Uuid> {
    let mut ids = Vec::new();
    let mut last = None;
    for ch in text.chars() {
        let c = replica
            .insert(ch.to_string(), last, None)
            .expect("append should always find room");
        last = Some(c.id);
        ids.push(c.id);
    }
    ids
}

/// The insert ops a fresh replica would need to reproduce `replica`'s
/// characters, in no particular order.
pub fn insert_ops(replica: &Replica) -> Vec<CrdtOp> {
    replica
        .characters()
        .values()
        .map(|c| CrdtOp::Insert {
            char_id: c.id,
            value: c.value.clone(),
            position: c.position.clone(),
        })
        .collect()
}

/// A collaboration server wired to a strict (non-permissive) in-memory store.
pub fn memory_server() -> (Arc<InMemoryStore>, Arc<CollabServer>) {
    let store = Arc::new(InMemoryStore::new());
    let server = Arc::new(CollabServer::in_memory(store.clone()));
    (store, server)
}

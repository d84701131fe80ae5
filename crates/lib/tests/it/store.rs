//! In-memory storage collaborators: op log ordering and access decisions.

use std::sync::Arc;

use cotext::crdt::{CrdtOp, Replica};
use cotext::store::in_memory::LinkAccessRole;
use cotext::store::{AccessControl, AccessDecision, InMemoryStore, OperationLog};
use uuid::Uuid;

use crate::helpers::{append_text, insert_ops};

#[tokio::test]
async fn op_log_preserves_append_order() {
    let store = InMemoryStore::new();
    let doc_id = Uuid::new_v4();

    let mut source = Replica::new("site-a");
    let ids = append_text(&mut source, "log");
    for op in insert_ops(&source) {
        store.append(doc_id, op).await.unwrap();
    }
    store
        .append(doc_id, CrdtOp::Delete { char_id: ids[0] })
        .await
        .unwrap();

    let ops = store.list_ordered(doc_id).await.unwrap();
    assert_eq!(ops.len(), 4);
    assert!(matches!(ops.last().unwrap(), CrdtOp::Delete { char_id } if *char_id == ids[0]));

    // Replaying the log yields the document.
    let mut replay = Replica::new("site-replay");
    for op in &ops {
        replay.apply(op);
    }
    assert_eq!(replay.extract_text(), "og");
}

#[tokio::test]
async fn op_log_is_empty_for_unknown_documents() {
    let store = InMemoryStore::new();
    assert!(store.list_ordered(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn access_follows_owner_member_and_link_roles() {
    let store = InMemoryStore::new();
    let owner = Uuid::new_v4();
    let member = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let doc_id = store.create_document(owner);
    store.add_member(doc_id, member);

    assert_eq!(
        store.check_access(owner, doc_id).await.unwrap(),
        AccessDecision::Granted
    );
    assert_eq!(
        store.check_access(member, doc_id).await.unwrap(),
        AccessDecision::Granted
    );
    assert_eq!(
        store.check_access(stranger, doc_id).await.unwrap(),
        AccessDecision::Forbidden
    );

    // A view link opens the document to anyone.
    store.set_link_access(doc_id, Some(LinkAccessRole::View));
    assert_eq!(
        store.check_access(stranger, doc_id).await.unwrap(),
        AccessDecision::Granted
    );
    store.set_link_access(doc_id, None);
    assert_eq!(
        store.check_access(stranger, doc_id).await.unwrap(),
        AccessDecision::Forbidden
    );
}

#[tokio::test]
async fn unknown_documents_are_not_found_unless_permissive() {
    let strict = InMemoryStore::new();
    let user = Uuid::new_v4();
    assert_eq!(
        strict.check_access(user, Uuid::new_v4()).await.unwrap(),
        AccessDecision::NotFound
    );

    let permissive = InMemoryStore::permissive();
    assert_eq!(
        permissive.check_access(user, Uuid::new_v4()).await.unwrap(),
        AccessDecision::Granted
    );
}

#[tokio::test]
async fn snapshot_overwrite_keeps_latest() {
    use cotext::store::SnapshotStore;

    let store = Arc::new(InMemoryStore::new());
    let doc_id = Uuid::new_v4();
    store.save(doc_id, "first".to_string()).await.unwrap();
    store.save(doc_id, "second".to_string()).await.unwrap();
    assert_eq!(store.load(doc_id).await.unwrap().as_deref(), Some("second"));
}

//! Session registry and broadcast behavior.

use cotext::session::{ConnectionHandle, SessionRegistry};
use cotext::store::{AccessControl, AccessDecision};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::helpers::memory_server;

fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<String> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}

#[test]
fn registration_reports_all_present_users_including_self() {
    let registry = SessionRegistry::new();
    let doc_id = Uuid::new_v4();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let (handle_a, _rx_a) = ConnectionHandle::channel(alice);
    let present = registry.register(doc_id, handle_a);
    assert_eq!(present, vec![alice]);

    let (handle_b, _rx_b) = ConnectionHandle::channel(bob);
    let mut present = registry.register(doc_id, handle_b);
    present.sort();
    let mut expected = vec![alice, bob];
    expected.sort();
    assert_eq!(present, expected);
    assert_eq!(registry.connection_count(doc_id), 2);
}

#[test]
fn broadcast_excludes_the_sender() {
    let registry = SessionRegistry::new();
    let doc_id = Uuid::new_v4();

    let (sender, mut sender_rx) = ConnectionHandle::channel(Uuid::new_v4());
    let (peer, mut peer_rx) = ConnectionHandle::channel(Uuid::new_v4());
    let sender_id = sender.id;
    registry.register(doc_id, sender);
    registry.register(doc_id, peer);

    registry.broadcast(doc_id, sender_id, r#"{"type":"delete"}"#);

    assert!(drain(&mut sender_rx).is_empty());
    assert_eq!(drain(&mut peer_rx), vec![r#"{"type":"delete"}"#.to_string()]);
}

#[test]
fn broadcast_skips_dead_connections_without_stalling() {
    let registry = SessionRegistry::new();
    let doc_id = Uuid::new_v4();

    let (dead, dead_rx) = ConnectionHandle::channel(Uuid::new_v4());
    let (live, mut live_rx) = ConnectionHandle::channel(Uuid::new_v4());
    registry.register(doc_id, dead);
    registry.register(doc_id, live);
    drop(dead_rx); // peer's socket task is gone

    registry.broadcast(doc_id, Uuid::new_v4(), "frame");
    assert_eq!(drain(&mut live_rx), vec!["frame".to_string()]);
}

#[test]
fn presence_broadcast_excludes_the_named_user() {
    let registry = SessionRegistry::new();
    let doc_id = Uuid::new_v4();
    let leaver = Uuid::new_v4();

    let (leaving, mut leaving_rx) = ConnectionHandle::channel(leaver);
    let (staying, mut staying_rx) = ConnectionHandle::channel(Uuid::new_v4());
    registry.register(doc_id, leaving);
    registry.register(doc_id, staying);

    registry.broadcast_presence(doc_id, leaver, "leave-frame");
    assert!(drain(&mut leaving_rx).is_empty());
    assert_eq!(drain(&mut staying_rx).len(), 1);
}

#[test]
fn close_is_idempotent_and_leave_fires_once() {
    let registry = SessionRegistry::new();
    let doc_id = Uuid::new_v4();
    let user = Uuid::new_v4();

    let (handle, _rx) = ConnectionHandle::channel(user);
    let conn_id = handle.id;
    registry.register(doc_id, handle);

    let first = registry.remove(doc_id, conn_id, user);
    assert!(first.removed_connection && first.removed_user);
    assert_eq!(registry.connection_count(doc_id), 0);
    assert!(registry.user_ids(doc_id).is_empty());

    // A repeated close notification removes nothing and must not trigger
    // another leave broadcast.
    let second = registry.remove(doc_id, conn_id, user);
    assert!(!second.removed_connection && !second.removed_user);
}

#[test]
fn second_connection_overwrites_the_user_mapping() {
    let registry = SessionRegistry::new();
    let doc_id = Uuid::new_v4();
    let user = Uuid::new_v4();

    let (first, _rx1) = ConnectionHandle::channel(user);
    let (second, _rx2) = ConnectionHandle::channel(user);
    registry.register(doc_id, first);
    registry.register(doc_id, second);

    // Both connections stay live, but presence tracks the user once.
    assert_eq!(registry.connection_count(doc_id), 2);
    assert_eq!(registry.user_ids(doc_id), vec![user]);
}

#[tokio::test]
async fn refused_connection_leaves_no_registry_state() {
    let (store, server) = memory_server();
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let doc_id = store.create_document(owner);

    // The handshake checks access before any registry mutation.
    assert_eq!(
        store.check_access(stranger, doc_id).await.unwrap(),
        AccessDecision::Forbidden
    );
    assert_eq!(
        store.check_access(owner, Uuid::new_v4()).await.unwrap(),
        AccessDecision::NotFound
    );
    assert_eq!(server.registry().connection_count(doc_id), 0);
    assert!(server.registry().user_ids(doc_id).is_empty());
}

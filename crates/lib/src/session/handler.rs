//! Per-connection session state machine.
//!
//! Each accepted WebSocket runs through `Connecting → Authorized → Active →
//! Closed`: the access check happens before any registry mutation, the
//! active phase relays frames between the socket and the rest of the
//! document's connections, and teardown deregisters and announces the leave
//! exactly once.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::errors::SessionError;
use super::protocol::{
    CaretBroadcast, ClientMessage, PresenceData, PresenceUser, ServerMessage, UserAction,
    color_for_user,
};
use super::registry::ConnectionHandle;
use super::server::CollabServer;
use crate::crdt::CrdtOp;
use crate::store::AccessDecision;

/// WebSocket close code sent when a handshake is refused.
const CLOSE_NOT_ACCEPTABLE: u16 = 1003;

/// Drive one connection from handshake to close.
pub(crate) async fn run_connection(
    server: Arc<CollabServer>,
    mut socket: WebSocket,
    doc_id: Uuid,
    user_id: Uuid,
) {
    // Connecting → Authorized. Refusal closes the socket with a reason and
    // leaves no registry state behind.
    if let Err(e) = authorize(&server, doc_id, user_id).await {
        let reason = if e.is_permission_denied() {
            "insufficient permissions"
        } else if e.is_not_found() {
            "document not found"
        } else {
            "access check failed"
        };
        if e.module() == "session" {
            info!(%doc_id, %user_id, error = %e, "connection refused");
        } else {
            error!(%doc_id, %user_id, error = %e, "access check failed");
        }
        close_with_reason(&mut socket, reason).await;
        return;
    }

    // Authorized → Active: register, send the presence snapshot to the
    // joiner, announce the join to everyone else.
    let (handle, mut outbound) = ConnectionHandle::channel(user_id);
    let conn_id = handle.id;
    let current_users = server.registry().register(doc_id, handle.clone());
    info!(%doc_id, %user_id, connection = %conn_id, "session opened");

    send_to(
        &handle,
        &ServerMessage::CurrentUsers {
            users: current_users
                .into_iter()
                .map(|id| PresenceUser {
                    user_id: id,
                    data: PresenceData {
                        color: color_for_user(id),
                    },
                })
                .collect(),
        },
    );
    broadcast_presence(
        &server,
        doc_id,
        user_id,
        &ServerMessage::UserEvent {
            action: UserAction::Join,
            user_id,
            data: Some(PresenceData {
                color: color_for_user(user_id),
            }),
        },
    );

    // Active: relay until either side goes away.
    let (mut ws_sender, mut ws_receiver) = socket.split();
    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => {
                    if ws_sender.send(Message::Text(text.into())).await.is_err() {
                        debug!(%doc_id, connection = %conn_id, "outbound send failed, closing");
                        break;
                    }
                }
                None => break,
            },
            inbound = ws_receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(&server, doc_id, user_id, &handle, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // pings are answered by the transport; binary is ignored
                Some(Err(e)) => {
                    debug!(%doc_id, connection = %conn_id, error = %e, "socket error, closing");
                    break;
                }
            },
        }
    }

    // Active → Closed: deregister and announce the leave to whoever remains.
    let departure = server.registry().remove(doc_id, conn_id, user_id);
    if departure.removed_user {
        broadcast_presence(
            &server,
            doc_id,
            user_id,
            &ServerMessage::UserEvent {
                action: UserAction::Leave,
                user_id,
                data: None,
            },
        );
    }
    info!(%doc_id, %user_id, connection = %conn_id, "session closed");
}

/// Map a handshake access decision into the crate error vocabulary.
async fn authorize(server: &Arc<CollabServer>, doc_id: Uuid, user_id: Uuid) -> crate::Result<()> {
    match server.access().check_access(user_id, doc_id).await? {
        AccessDecision::Granted => Ok(()),
        AccessDecision::Forbidden => Err(SessionError::AccessDenied { user_id, doc_id }.into()),
        AccessDecision::NotFound => Err(SessionError::DocumentNotFound { doc_id }.into()),
    }
}

/// Classify and service one inbound text frame.
async fn handle_frame(
    server: &Arc<CollabServer>,
    doc_id: Uuid,
    user_id: Uuid,
    handle: &ConnectionHandle,
    text: &str,
) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            // Reported to the sender only; never relayed. The connection
            // stays open.
            let err = SessionError::MalformedMessage {
                reason: e.to_string(),
            };
            debug!(%doc_id, %user_id, error = %err, "malformed frame");
            send_to(
                handle,
                &ServerMessage::Error {
                    message: err.to_string(),
                },
            );
            return;
        }
    };

    match &message {
        ClientMessage::CaretUpdate { offset } => {
            let frame = ServerMessage::CaretUpdate {
                data: CaretBroadcast {
                    user_id,
                    offset: *offset,
                },
            };
            match encode(&frame) {
                Ok(json) => server.registry().broadcast(doc_id, handle.id, &json),
                Err(e) => warn!(%doc_id, error = %e, "caret relay dropped"),
            }
        }
        edit => {
            if let Some(op) = edit.to_op() {
                relay_edit(server, doc_id, user_id, handle, text, op).await;
            }
        }
    }
}

/// Apply an edit, schedule its durable append, and relay the original frame
/// verbatim to every other connection on the document.
async fn relay_edit(
    server: &Arc<CollabServer>,
    doc_id: Uuid,
    user_id: Uuid,
    handle: &ConnectionHandle,
    text: &str,
    op: CrdtOp,
) {
    if let Err(e) = server.cache().apply(doc_id, &op).await {
        error!(%doc_id, %user_id, error = %e, "failed to apply edit");
        send_to(
            handle,
            &ServerMessage::Error {
                message: "edit could not be applied".to_string(),
            },
        );
        return;
    }

    // Durability is decoupled from the relay: append in the background,
    // log-and-continue on failure.
    let ops = server.ops().clone();
    tokio::spawn(async move {
        if let Err(e) = ops.append(doc_id, op).await {
            warn!(%doc_id, error = %e, "operation log append failed");
        }
    });

    server.registry().broadcast(doc_id, handle.id, text);
}

/// Serialize a server frame for the wire.
fn encode(frame: &ServerMessage) -> Result<String, SessionError> {
    serde_json::to_string(frame).map_err(|e| SessionError::EncodeFailed {
        reason: e.to_string(),
    })
}

/// Queue a server frame for a single connection.
fn send_to(handle: &ConnectionHandle, frame: &ServerMessage) {
    match encode(frame) {
        Ok(json) => {
            if !handle.send(json) {
                debug!(connection = %handle.id, "connection gone before frame was queued");
            }
        }
        Err(e) => warn!(connection = %handle.id, error = %e, "frame dropped"),
    }
}

/// Encode and deliver a presence frame to everyone except `exclude_user`.
fn broadcast_presence(
    server: &Arc<CollabServer>,
    doc_id: Uuid,
    exclude_user: Uuid,
    frame: &ServerMessage,
) {
    match encode(frame) {
        Ok(json) => server
            .registry()
            .broadcast_presence(doc_id, exclude_user, &json),
        Err(e) => warn!(%doc_id, error = %e, "presence frame dropped"),
    }
}

async fn close_with_reason(socket: &mut WebSocket, reason: &str) {
    let frame = CloseFrame {
        code: CLOSE_NOT_ACCEPTABLE,
        reason: reason.to_string().into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "failed to send close frame");
    }
}

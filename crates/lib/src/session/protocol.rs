//! Wire protocol for document sessions.
//!
//! Every frame is a JSON object discriminated by a `"type"` field.
//! [`ClientMessage`] covers what clients send; [`ServerMessage`] covers
//! frames the server originates. Edit operations are relayed to other
//! clients verbatim, so their wire shape is exactly [`CrdtOp`]'s.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::COLOR_PALETTE_SIZE;
use crate::crdt::{CrdtOp, Position};

/// A frame received from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Insert a character at an already-allocated position.
    #[serde(rename_all = "camelCase")]
    Insert {
        char_id: Uuid,
        value: String,
        position: Position,
    },
    /// Tombstone a character.
    #[serde(rename_all = "camelCase")]
    Delete { char_id: Uuid },
    /// The sender moved their caret. Never applied to the replica.
    CaretUpdate { offset: u64 },
}

impl ClientMessage {
    /// The edit operation this frame carries, if it is one.
    pub fn to_op(&self) -> Option<CrdtOp> {
        match self {
            ClientMessage::Insert {
                char_id,
                value,
                position,
            } => Some(CrdtOp::Insert {
                char_id: *char_id,
                value: value.clone(),
                position: position.clone(),
            }),
            ClientMessage::Delete { char_id } => Some(CrdtOp::Delete { char_id: *char_id }),
            ClientMessage::CaretUpdate { .. } => None,
        }
    }
}

/// A frame originated by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A relayed caret move, re-wrapped with the sender's identity.
    CaretUpdate { data: CaretBroadcast },
    /// Full presence snapshot, sent to a newly-joined connection only.
    CurrentUsers { users: Vec<PresenceUser> },
    /// A user joined or left the document.
    #[serde(rename_all = "camelCase")]
    UserEvent {
        action: UserAction,
        user_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<PresenceData>,
    },
    /// Reported to the offending sender only.
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAction {
    Join,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaretBroadcast {
    pub user_id: Uuid,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUser {
    pub user_id: Uuid,
    pub data: PresenceData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceData {
    pub color: u32,
}

/// Deterministic decorative color index for a user, stable across sessions
/// and processes.
pub fn color_for_user(user_id: Uuid) -> u32 {
    let (hi, lo) = user_id.as_u64_pair();
    let mut rng = StdRng::seed_from_u64(hi ^ lo);
    rng.gen_range(0..COLOR_PALETTE_SIZE)
}

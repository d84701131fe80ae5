//! Replicated edit operations.
//!
//! A [`CrdtOp`] is the unit of change exchanged between replicas and appended
//! to the durable operation log. The JSON form is discriminated by a `"type"`
//! field (`"insert"` / `"delete"`), matching the wire envelope.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crdt::Position;

/// An edit operation on a replicated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CrdtOp {
    /// Place a character at an already-allocated position.
    #[serde(rename_all = "camelCase")]
    Insert {
        char_id: Uuid,
        value: String,
        position: Position,
    },
    /// Tombstone a character.
    #[serde(rename_all = "camelCase")]
    Delete { char_id: Uuid },
}

impl CrdtOp {
    /// The character this operation targets.
    pub fn char_id(&self) -> Uuid {
        match self {
            CrdtOp::Insert { char_id, .. } | CrdtOp::Delete { char_id } => *char_id,
        }
    }
}

//! Per-document replica state.
//!
//! A [`Replica`] owns every character ever inserted into one document,
//! tombstones included, keyed by character id. Inserts allocate a fresh
//! [`Position`] between the neighbors' positions; deletes only flip the
//! tombstone flag so that causally-late operations referencing the character
//! remain valid. Two replicas holding the same character set extract the same
//! text no matter what order the operations were applied in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_BASE, DEFAULT_BOUNDARY};
use crate::crdt::op::CrdtOp;
use crate::crdt::position::{path_after, path_before, path_between, path_initial};
use crate::crdt::{CRDTError, Position};

/// A single textual unit with its place in the document.
///
/// The id and position are fixed at creation; only the tombstone flag ever
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: Uuid,
    pub value: String,
    pub position: Position,
    #[serde(default)]
    pub deleted: bool,
}

impl Character {
    fn new(value: String, position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            value,
            position,
            deleted: false,
        }
    }
}

/// CRDT state for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replica {
    site_id: String,
    clock: u64,
    base: i64,
    boundary: i64,
    characters: HashMap<Uuid, Character>,
}

impl Replica {
    /// Create an empty replica with the default digit base.
    pub fn new(site_id: impl Into<String>) -> Self {
        Self::with_base(site_id, DEFAULT_BASE)
    }

    /// Create an empty replica with an explicit digit base.
    pub fn with_base(site_id: impl Into<String>, base: i64) -> Self {
        Self {
            site_id: site_id.into(),
            clock: 0,
            base,
            boundary: DEFAULT_BOUNDARY,
            characters: HashMap::new(),
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn set_boundary(&mut self, boundary: i64) {
        self.boundary = boundary;
    }

    /// All characters by id, tombstones included.
    pub fn characters(&self) -> &HashMap<Uuid, Character> {
        &self.characters
    }

    pub fn get(&self, id: &Uuid) -> Option<&Character> {
        self.characters.get(id)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Allocate a position strictly between `prev` and `next`.
    ///
    /// `None` stands for the document boundary on that side. The returned
    /// position carries this replica's site id and freshly advanced clock.
    pub fn position_between(
        &mut self,
        prev: Option<&Position>,
        next: Option<&Position>,
    ) -> Result<Position, CRDTError> {
        let index = match (prev, next) {
            (None, None) => path_initial(self.base),
            (None, Some(next)) => path_before(&next.index, self.boundary),
            (Some(prev), None) => path_after(&prev.index, self.base),
            (Some(prev), Some(next)) => path_between(&prev.index, &next.index, self.base)?,
        };
        let clock = self.tick();
        Ok(Position::new(index, self.site_id.clone(), clock))
    }

    /// Insert a new character between two existing ones.
    ///
    /// An absent neighbor id means the document start/end. A neighbor id that
    /// does not resolve is an error.
    pub fn insert(
        &mut self,
        value: impl Into<String>,
        prev_id: Option<Uuid>,
        next_id: Option<Uuid>,
    ) -> Result<Character, CRDTError> {
        let prev = self.resolve(prev_id)?.cloned();
        let next = self.resolve(next_id)?.cloned();
        let position = self.position_between(prev.as_ref(), next.as_ref())?;
        let character = Character::new(value.into(), position);
        self.characters.insert(character.id, character.clone());
        Ok(character)
    }

    fn resolve(&self, id: Option<Uuid>) -> Result<Option<&Position>, CRDTError> {
        match id {
            None => Ok(None),
            Some(id) => match self.characters.get(&id) {
                Some(c) => Ok(Some(&c.position)),
                None => Err(CRDTError::CharacterNotFound { id }),
            },
        }
    }

    /// Tombstone a character. Unknown ids are ignored so re-delivered or
    /// causally-late deletes stay harmless.
    pub fn delete(&mut self, char_id: Uuid) {
        if let Some(c) = self.characters.get_mut(&char_id) {
            c.deleted = true;
        }
    }

    /// Apply a remote operation verbatim.
    ///
    /// Inserts store the character under the operation's own id and position;
    /// the local clock is not advanced. A re-delivered insert for a known id
    /// is ignored, so a tombstone set in between is never flipped back.
    pub fn apply(&mut self, op: &CrdtOp) {
        match op {
            CrdtOp::Insert {
                char_id,
                value,
                position,
            } => {
                self.characters.entry(*char_id).or_insert_with(|| Character {
                    id: *char_id,
                    value: value.clone(),
                    position: position.clone(),
                    deleted: false,
                });
            }
            CrdtOp::Delete { char_id } => self.delete(*char_id),
        }
    }

    /// Adopt every character from `other` that is missing locally. On an id
    /// collision the copy with the greater position wins; equal positions
    /// keep the local copy, which preserves local tombstones.
    pub fn merge(&mut self, other: &Replica) {
        for (id, theirs) in &other.characters {
            match self.characters.get(id) {
                None => {
                    self.characters.insert(*id, theirs.clone());
                }
                Some(ours) => {
                    if theirs.position > ours.position {
                        self.characters.insert(*id, theirs.clone());
                    }
                }
            }
        }
    }

    /// All characters in position order, tombstones included.
    pub fn sorted_characters(&self) -> Vec<&Character> {
        let mut chars: Vec<_> = self.characters.values().collect();
        chars.sort_by(|a, b| a.position.cmp(&b.position));
        chars
    }

    /// Live characters in position order.
    pub fn visible_characters(&self) -> impl Iterator<Item = &Character> {
        self.sorted_characters()
            .into_iter()
            .filter(|c| !c.deleted)
    }

    /// The document text: live characters concatenated in position order.
    pub fn extract_text(&self) -> String {
        self.visible_characters().map(|c| c.value.as_str()).collect()
    }

    /// Index of a character among the live characters, or `None` if the id
    /// is unknown. A tombstoned character maps to the index it would occupy.
    pub fn visible_index_of(&self, char_id: Uuid) -> Option<usize> {
        let mut index = 0;
        for c in self.sorted_characters() {
            if c.id == char_id {
                return Some(index);
            }
            if !c.deleted {
                index += 1;
            }
        }
        None
    }

    /// Serialize the full replica state for the durable snapshot store.
    pub fn to_snapshot(&self) -> Result<String, CRDTError> {
        serde_json::to_string(self).map_err(|e| CRDTError::SerializationFailed {
            reason: e.to_string(),
        })
    }

    /// Rebuild a replica from a durable snapshot.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, CRDTError> {
        serde_json::from_str(snapshot).map_err(|e| CRDTError::DeserializationFailed {
            reason: e.to_string(),
        })
    }
}

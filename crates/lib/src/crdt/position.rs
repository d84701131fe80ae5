//! Densely-orderable character positions.
//!
//! A [`Position`] is a path of digits into a conceptual dense tree, tagged
//! with the allocating replica's site id and logical clock. The total order
//! over positions is what gives every character a stable place in the
//! document regardless of the order operations arrive in.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_INDEX_DEPTH;
use crate::crdt::CRDTError;

/// A totally-ordered, densely-packable identifier for a character slot.
///
/// Ordering compares the digit paths element-wise; a path that is a strict
/// prefix of another sorts first. Full path ties are broken by site id
/// (lexicographic), then by clock. Two characters allocated by different
/// replicas can therefore never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Digit path into the dense tree. Signed: inserting before the document
    /// start can step below zero.
    pub index: Vec<i64>,
    /// Identity of the replica that allocated this position.
    pub site_id: String,
    /// Value of the allocating replica's logical clock at allocation time.
    pub clock: u64,
}

impl Position {
    pub fn new(index: Vec<i64>, site_id: impl Into<String>, clock: u64) -> Self {
        Self {
            index,
            site_id: site_id.into(),
            clock,
        }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.index.len().min(other.index.len());
        for i in 0..len {
            match self.index[i].cmp(&other.index[i]) {
                Ordering::Equal => {}
                non_eq => return non_eq,
            }
        }
        self.index
            .len()
            .cmp(&other.index.len())
            .then_with(|| self.site_id.cmp(&other.site_id))
            .then_with(|| self.clock.cmp(&other.clock))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Digit path for the very first character of an empty document.
pub(super) fn path_initial(base: i64) -> Vec<i64> {
    vec![base]
}

/// Digit path strictly before `next`.
///
/// Subtracting the full boundary when there is room leaves space for further
/// inserts-before without descending a level.
pub(super) fn path_before(next: &[i64], boundary: i64) -> Vec<i64> {
    let lead = next.first().copied().unwrap_or(0);
    if lead <= boundary {
        vec![lead - 1]
    } else {
        vec![lead - boundary]
    }
}

/// Digit path strictly after `prev`, by descending one level.
pub(super) fn path_after(prev: &[i64], base: i64) -> Vec<i64> {
    let mut path = prev.to_vec();
    path.push(base);
    path
}

/// Digit path strictly between `prev` and `next`.
///
/// Walks both paths in lock-step. Missing digits read as 0 on the `prev`
/// side and as `base` on the `next` side. The first depth with a gap wider
/// than one digit takes the midpoint; otherwise the walk copies `prev`'s
/// digit and descends, which always manufactures a usable gap once both
/// paths are exhausted.
pub(super) fn path_between(prev: &[i64], next: &[i64], base: i64) -> Result<Vec<i64>, CRDTError> {
    let mut path = Vec::new();
    for depth in 0..=MAX_INDEX_DEPTH {
        let p = prev.get(depth).copied().unwrap_or(0);
        let n = next.get(depth).copied().unwrap_or(base);
        let gap = n - p;
        if gap > 1 {
            path.push(p + gap / 2);
            return Ok(path);
        }
        path.push(p);
    }
    Err(CRDTError::PathDepthExceeded {
        max: MAX_INDEX_DEPTH,
    })
}

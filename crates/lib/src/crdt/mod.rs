//! Conflict-free replicated document engine.
//!
//! Characters carry densely-orderable [`Position`]s instead of array offsets,
//! so concurrent inserts and deletes commute: replicas that have seen the
//! same set of operations extract identical text regardless of delivery
//! order.
//!
//! # Core Types
//!
//! - [`Position`] - Totally-ordered, densely-packable character slot identifier
//! - [`Character`] - One textual unit with its position and tombstone flag
//! - [`Replica`] - Per-document character map with insert/delete/merge/extract
//! - [`CrdtOp`] - Tagged edit operation exchanged between replicas

pub mod errors;
pub mod op;
pub mod position;
pub mod replica;

pub use errors::CRDTError;
pub use op::CrdtOp;
pub use position::Position;
pub use replica::{Character, Replica};

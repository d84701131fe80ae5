//! Constants used throughout the Cotext library.
//!
//! This module provides central definitions for the tuning knobs of the
//! position allocator and the presence layer.

/// Default digit radix used when extending a position path.
pub const DEFAULT_BASE: i64 = 32;

/// Default jitter bound applied when allocating before the first character.
pub const DEFAULT_BOUNDARY: i64 = 10;

/// Hard cap on position path depth. Allocation fails rather than grow past this.
pub const MAX_INDEX_DEPTH: usize = 128;

/// Number of presence colors a user id can hash to.
pub const COLOR_PALETTE_SIZE: u32 = 8;

//! Conflict detection core: the interval predicate and the checker that
//! applies it to persisted entries.

pub mod conflict;
pub mod interval;

pub use conflict::{detect, Axis, Conflict, ConflictChecker};
pub use interval::{overlaps, TimeRange};

//! Domain model for the two-list todo app.
//!
//! # Responsibility
//! - Define canonical data structures used by store and controller.
//!
//! # Invariants
//! - Every todo is identified by a unique, monotonic `TodoId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod todo;

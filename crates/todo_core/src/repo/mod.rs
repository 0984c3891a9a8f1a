//! Repository layer: local key-value storage and the todo blob store.
//!
//! # Responsibility
//! - Define the storage primitive contract (`KvRepository`).
//! - Isolate SQLite and JSON details from controller orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`InvalidKey`, `Deserialization`)
//!   in addition to DB transport errors.

pub mod kv_repo;
pub mod todo_store;

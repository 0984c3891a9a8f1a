//! Core use-case services.
//!
//! # Responsibility
//! - Own in-memory view state and orchestrate store calls per mutation.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod todo_controller;

//! Core logic for the two-list todo app.
//! This crate owns the todo data model, its local persistence, and the
//! controller that keeps view state and storage in step.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::todo::{Category, Todo, TodoCollection, TodoId, TodoValidationError};
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use repo::todo_store::{StoreError, StoreResult, TodoStore, TODO_STORAGE_KEY};
pub use service::todo_controller::{
    DeleteDecision, DeletePrompt, LoadState, TodoListController,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

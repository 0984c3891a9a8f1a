//! Flutter bridge for the todo core.

pub mod api;

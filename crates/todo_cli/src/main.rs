//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `todo_core` linkage without the Flutter runtime.
//! - Print a per-category summary of a store file.
//!
//! Usage: `todo_cli [db_path]`

use std::process::ExitCode;
use todo_core::db::open_db;
use todo_core::{Category, SqliteKvRepository, TodoStore};

fn main() -> ExitCode {
    println!("todo_core ping={}", todo_core::ping());
    println!("todo_core version={}", todo_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let store = TodoStore::new(SqliteKvRepository::new(conn));
    match store.load() {
        Ok(todos) => {
            for category in [Category::Work, Category::Travel] {
                println!("{}={}", category.label(), todos.count_in(category));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to load todos: {err}");
            ExitCode::FAILURE
        }
    }
}

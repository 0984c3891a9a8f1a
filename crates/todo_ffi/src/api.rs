//! FFI use-case API for the Flutter todo screen.
//!
//! # Responsibility
//! - Expose the controller's mutation surface to Dart via FRB.
//! - Own the single process-wide controller instance.
//! - Flatten core types into plain view envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The controller is created lazily and initialized exactly once.
//! - Ids cross the boundary as decimal strings.

use log::warn;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use todo_core::db::open_db;
use todo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Category, DeleteDecision, DeletePrompt, SqliteKvRepository, Todo, TodoId, TodoListController,
    TodoStore,
};

const DB_FILE_NAME: &str = "todo_list.sqlite3";
const DB_PATH_ENV: &str = "TODO_DB_PATH";

type Controller = TodoListController<SqliteKvRepository>;

static CONTROLLER: Mutex<Option<Controller>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive); empty selects
///   the build default (`debug` or `info`).
/// - `log_dir`: absolute directory for rolling log files.
/// - Returns empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    /// `WORK` or `TRAVEL`.
    pub category: String,
}

/// Everything the screen needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoViewState {
    /// `WORK` or `TRAVEL`.
    pub active_category: String,
    pub input_placeholder: String,
    pub input_text: String,
    /// Show the activity indicator instead of the list.
    pub loading: bool,
    /// `false` after a failed load or save, until the next successful save.
    pub storage_synced: bool,
    pub items: Vec<TodoItem>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    pub ok: bool,
    /// Affected todo id, when there is one.
    pub todo_id: Option<String>,
    pub message: String,
}

impl TodoActionResponse {
    fn success(message: impl Into<String>, todo_id: Option<TodoId>) -> Self {
        Self {
            ok: true,
            todo_id: todo_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            todo_id: None,
            message: message.into(),
        }
    }
}

/// Delete confirmation dialog content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePromptResponse {
    pub ok: bool,
    pub title: String,
    pub message: String,
    pub cancel_label: String,
    pub confirm_label: String,
}

/// Opens the store at `db_path` and loads it into a fresh controller.
///
/// Empty `db_path` falls back to `TODO_DB_PATH`, then to a file in the
/// system temp directory. Replaces any controller opened earlier.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_open(db_path: String) -> TodoActionResponse {
    let path = resolve_db_path(&db_path);
    match open_controller(&path) {
        Ok(controller) => {
            let count = controller.snapshot().len();
            *lock_controller() = Some(controller);
            TodoActionResponse::success(format!("Loaded {count} todo(s)."), None)
        }
        Err(err) => TodoActionResponse::failure(format!("todo_open failed: {err}")),
    }
}

/// Returns the current view state.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_view() -> TodoViewState {
    match with_controller(|controller| view_state(controller)) {
        Ok(view) => view,
        Err(err) => {
            warn!("event=ffi_view module=ffi status=error error={err}");
            TodoViewState {
                active_category: Category::default().as_str().to_string(),
                input_placeholder: Category::default().input_placeholder().to_string(),
                input_text: String::new(),
                loading: false,
                storage_synced: false,
                items: Vec::new(),
            }
        }
    }
}

/// Switches the active list (`work` or `travel`).
#[flutter_rust_bridge::frb(sync)]
pub fn todo_set_category(category: String) -> TodoActionResponse {
    let Some(category) = Category::parse(&category) else {
        return TodoActionResponse::failure(format!("unknown category `{category}`"));
    };
    match with_controller(|controller| controller.set_category(category)) {
        Ok(()) => TodoActionResponse::success(category.label(), None),
        Err(err) => TodoActionResponse::failure(err),
    }
}

/// Mirrors the text field into the pending input buffer.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_set_input(text: String) -> TodoActionResponse {
    match with_controller(|controller| controller.set_input(text)) {
        Ok(()) => TodoActionResponse::success("", None),
        Err(err) => TodoActionResponse::failure(err),
    }
}

/// Submits the pending input as a new todo.
///
/// Blank input is not an error: `ok` stays `true` and no id is returned.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_submit() -> TodoActionResponse {
    match with_controller(|controller| controller.submit_input()) {
        Ok(Some(id)) => TodoActionResponse::success("Todo added.", Some(id)),
        Ok(None) => TodoActionResponse::success("Nothing to add.", None),
        Err(err) => TodoActionResponse::failure(err),
    }
}

/// Opens a delete confirmation for `todo_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_request_delete(todo_id: String) -> DeletePromptResponse {
    let result = match TodoId::parse(&todo_id) {
        Some(id) => with_controller(|controller| controller.request_delete(id)),
        None => Ok(None),
    };
    to_delete_prompt_response(&todo_id, result)
}

/// Answers the open delete confirmation.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_resolve_delete(confirm: bool) -> TodoActionResponse {
    let decision = if confirm {
        DeleteDecision::Confirm
    } else {
        DeleteDecision::Cancel
    };
    match with_controller(|controller| controller.resolve_delete(decision)) {
        Ok(Some(removed)) => TodoActionResponse::success("Todo deleted.", Some(removed.id)),
        Ok(None) => TodoActionResponse::success("Nothing deleted.", None),
        Err(err) => TodoActionResponse::failure(err),
    }
}

fn resolve_db_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        return PathBuf::from(trimmed);
    }
    if let Ok(from_env) = std::env::var(DB_PATH_ENV) {
        let from_env = from_env.trim();
        if !from_env.is_empty() {
            return PathBuf::from(from_env);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

fn open_controller(path: &Path) -> Result<Controller, String> {
    let conn = open_db(path).map_err(|err| format!("storage open failed: {err}"))?;
    let mut controller = TodoListController::new(TodoStore::new(SqliteKvRepository::new(conn)));
    controller.initialize();
    Ok(controller)
}

fn lock_controller() -> MutexGuard<'static, Option<Controller>> {
    CONTROLLER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_controller<T>(f: impl FnOnce(&mut Controller) -> T) -> Result<T, String> {
    let mut slot = lock_controller();
    if slot.is_none() {
        *slot = Some(open_controller(&resolve_db_path(""))?);
    }
    match slot.as_mut() {
        Some(controller) => Ok(f(controller)),
        None => Err("controller unavailable".to_string()),
    }
}

fn view_state(controller: &Controller) -> TodoViewState {
    let category = controller.active_category();
    TodoViewState {
        active_category: category.as_str().to_string(),
        input_placeholder: category.input_placeholder().to_string(),
        input_text: controller.input().to_string(),
        loading: controller.is_loading(),
        storage_synced: controller.is_storage_synced(),
        items: controller.visible_todos().map(to_todo_item).collect(),
    }
}

fn to_delete_prompt_response(
    todo_id: &str,
    result: Result<Option<DeletePrompt>, String>,
) -> DeletePromptResponse {
    let failed = |message: String| DeletePromptResponse {
        ok: false,
        title: String::new(),
        message,
        cancel_label: String::new(),
        confirm_label: String::new(),
    };
    match result {
        Ok(Some(prompt)) => DeletePromptResponse {
            ok: true,
            title: prompt.title.to_string(),
            message: prompt.message.to_string(),
            cancel_label: prompt.cancel_label.to_string(),
            confirm_label: prompt.confirm_label.to_string(),
        },
        Ok(None) => failed(format!("todo not found: {todo_id}")),
        Err(err) => failed(format!("todo_request_delete failed: {err}")),
    }
}

fn to_todo_item(todo: &Todo) -> TodoItem {
    TodoItem {
        id: todo.id.to_string(),
        text: todo.text.clone(),
        category: todo.category.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, resolve_db_path, to_delete_prompt_response, todo_open,
        todo_request_delete, todo_resolve_delete, todo_set_category, todo_set_input, todo_submit,
        todo_view,
    };
    use rusqlite::Connection;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn explicit_db_path_wins() {
        assert_eq!(
            resolve_db_path("  /data/todos.sqlite3 "),
            std::path::PathBuf::from("/data/todos.sqlite3")
        );
    }

    #[test]
    fn delete_prompt_reports_controller_failure_separately_from_missing_todo() {
        let failed = to_delete_prompt_response(
            "42",
            Err("storage open failed: unable to open database file".to_string()),
        );
        assert!(!failed.ok);
        assert!(failed.message.starts_with("todo_request_delete failed:"));
        assert!(failed.message.contains("unable to open database file"));

        let missing = to_delete_prompt_response("42", Ok(None));
        assert!(!missing.ok);
        assert_eq!(missing.message, "todo not found: 42");
    }

    #[test]
    fn set_category_rejects_unknown_names() {
        let response = todo_set_category("home".to_string());
        assert!(!response.ok);
    }

    // Single scenario test: the controller is process-wide state.
    #[test]
    fn screen_flow_persists_across_reopen() {
        let db_path = unique_db_path("screen-flow");
        let db_path_str = db_path.to_str().unwrap().to_string();

        let opened = todo_open(db_path_str.clone());
        assert!(opened.ok, "{}", opened.message);
        let view = todo_view();
        assert!(!view.loading);
        assert!(view.items.is_empty());
        assert_eq!(view.active_category, "WORK");
        assert_eq!(view.input_placeholder, "Add a To Do");

        todo_set_input("Buy milk".to_string());
        let added = todo_submit();
        assert!(added.ok, "{}", added.message);
        let work_id = added.todo_id.unwrap();
        assert_eq!(todo_view().input_text, "");

        todo_set_input("   ".to_string());
        assert_eq!(todo_submit().todo_id, None);

        assert!(todo_set_category("travel".to_string()).ok);
        let travel_view = todo_view();
        assert!(travel_view.items.is_empty());
        assert_eq!(travel_view.input_placeholder, "Where do you want to go?");
        todo_set_input("Jeju".to_string());
        let travel_id = todo_submit().todo_id.unwrap();

        let prompt = todo_request_delete(work_id.clone());
        assert!(prompt.ok);
        assert_eq!(prompt.title, "Delete Todo");
        assert_eq!(todo_resolve_delete(false).todo_id, None);

        todo_request_delete(work_id.clone());
        assert_eq!(todo_resolve_delete(true).todo_id, Some(work_id.clone()));
        assert!(!todo_request_delete(work_id).ok);

        let conn = Connection::open(&db_path).unwrap();
        let blob: String = conn
            .query_row("SELECT value FROM kv_store WHERE key = '@todos';", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(
            blob,
            format!(r#"{{"{travel_id}":{{"text":"Jeju","category":"TRAVEL"}}}}"#)
        );

        assert!(todo_open(db_path_str).ok);
        let reopened = todo_view();
        assert_eq!(reopened.active_category, "WORK");
        assert!(reopened.items.is_empty());
        todo_set_category("TRAVEL".to_string());
        let items = todo_view().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, travel_id);
        assert_eq!(items[0].text, "Jeju");
    }

    fn unique_db_path(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}-{}-{nanos}.sqlite3", std::process::id()))
    }
}

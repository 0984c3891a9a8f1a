//! Todo list controller.
//!
//! # Responsibility
//! - Own the authoritative in-memory collection and the active category.
//! - Mediate every mutation and persist the full collection after each one.
//! - Gate deletion behind a confirm/cancel step.
//!
//! # Invariants
//! - The collection is replaced copy-on-write; snapshots handed out earlier
//!   are never mutated.
//! - Storage failures never roll back in-memory state; they only clear the
//!   `storage_synced` flag until the next successful save.
//! - Nothing is visible and nothing can be mutated before the first load
//!   completes.

use crate::model::todo::{epoch_millis_now, Category, Todo, TodoCollection, TodoId};
use crate::repo::kv_repo::KvRepository;
use crate::repo::todo_store::{StoreError, TodoStore};
use log::{debug, info, warn};
use std::sync::Arc;

/// Loading lifecycle of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

/// User answer to a delete confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDecision {
    Cancel,
    Confirm,
}

/// Confirmation dialog content for a pending delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub todo_id: TodoId,
    pub title: &'static str,
    pub message: &'static str,
    pub cancel_label: &'static str,
    pub confirm_label: &'static str,
}

impl DeletePrompt {
    fn for_todo(todo_id: TodoId) -> Self {
        Self {
            todo_id,
            title: "Delete Todo",
            message: "Are you sure?",
            cancel_label: "cancel",
            confirm_label: "delete",
        }
    }
}

/// Single owner of todo view state.
pub struct TodoListController<R: KvRepository> {
    store: TodoStore<R>,
    todos: Arc<TodoCollection>,
    active_category: Category,
    input: String,
    pending_delete: Option<TodoId>,
    load_state: LoadState,
    storage_synced: bool,
    clock: fn() -> i64,
}

impl<R: KvRepository> TodoListController<R> {
    /// Creates an unloaded controller using the system clock for ids.
    pub fn new(store: TodoStore<R>) -> Self {
        Self::with_clock(store, epoch_millis_now)
    }

    /// Creates an unloaded controller with a custom millisecond clock.
    pub fn with_clock(store: TodoStore<R>, clock: fn() -> i64) -> Self {
        Self {
            store,
            todos: Arc::new(TodoCollection::new()),
            active_category: Category::default(),
            input: String::new(),
            pending_delete: None,
            load_state: LoadState::NotLoaded,
            storage_synced: false,
            clock,
        }
    }

    /// Loads the stored collection once.
    ///
    /// Returns `false` without touching state when already initialized.
    /// A malformed blob or failed read leaves an empty collection and marks
    /// storage as out of sync.
    pub fn initialize(&mut self) -> bool {
        if self.load_state != LoadState::NotLoaded {
            warn!(
                "event=controller_init module=controller status=skipped reason=already_initialized"
            );
            return false;
        }

        self.load_state = LoadState::Loading;
        let collection = match self.store.load() {
            Ok(collection) => {
                self.storage_synced = true;
                collection
            }
            Err(err @ StoreError::Deserialization(_)) => {
                warn!(
                    "event=controller_init module=controller status=degraded error_code=store_corrupt action=reset_to_empty error={err}"
                );
                self.storage_synced = false;
                TodoCollection::new()
            }
            Err(err) => {
                warn!(
                    "event=controller_init module=controller status=degraded error_code=storage_io action=start_empty error={err}"
                );
                self.storage_synced = false;
                TodoCollection::new()
            }
        };

        self.todos = Arc::new(collection);
        self.load_state = LoadState::Loaded;
        info!(
            "event=controller_init module=controller status=ok count={} synced={}",
            self.todos.len(),
            self.storage_synced
        );
        true
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Whether a loading indicator should be shown.
    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    /// Whether the last storage round-trip succeeded.
    pub fn is_storage_synced(&self) -> bool {
        self.storage_synced
    }

    pub fn active_category(&self) -> Category {
        self.active_category
    }

    /// Switches the visible list. In-memory only.
    pub fn set_category(&mut self, category: Category) {
        if self.active_category != category {
            debug!(
                "event=category_switch module=controller from={} to={}",
                self.active_category.as_str(),
                category.as_str()
            );
        }
        self.active_category = category;
    }

    /// Pending text of the input field.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Adds a todo to the active category and persists the collection.
    ///
    /// Returns `None` (no-op) when `text` is blank, nothing is loaded yet, or
    /// no id above the newest stored one is left.
    /// Clears the input buffer on success.
    pub fn add_todo(&mut self, text: &str) -> Option<TodoId> {
        if !self.ensure_loaded("todo_add") {
            return None;
        }

        let Some(id) = TodoId::next((self.clock)(), self.todos.last_id()) else {
            warn!("event=todo_add module=controller status=rejected reason=id_overflow");
            return None;
        };
        let todo = match Todo::new(id, text, self.active_category) {
            Ok(todo) => todo,
            Err(err) => {
                debug!("event=todo_add module=controller status=rejected reason=\"{err}\"");
                return None;
            }
        };

        let mut next = TodoCollection::clone(&self.todos);
        next.insert(todo);
        self.publish(next);
        self.input.clear();
        info!(
            "event=todo_add module=controller status=ok todo_id={id} category={}",
            self.active_category.as_str()
        );
        Some(id)
    }

    /// Submits the current input buffer as a new todo.
    pub fn submit_input(&mut self) -> Option<TodoId> {
        let text = self.input.clone();
        self.add_todo(&text)
    }

    /// Opens a delete confirmation for `id`.
    ///
    /// Returns `None` when the id is unknown. Replaces any earlier pending
    /// confirmation.
    pub fn request_delete(&mut self, id: TodoId) -> Option<DeletePrompt> {
        if !self.todos.contains(id) {
            debug!("event=todo_delete module=controller status=ignored reason=not_found todo_id={id}");
            return None;
        }
        self.pending_delete = Some(id);
        Some(DeletePrompt::for_todo(id))
    }

    /// Id awaiting confirmation, if a prompt is open.
    pub fn pending_delete(&self) -> Option<TodoId> {
        self.pending_delete
    }

    /// Closes the open confirmation.
    ///
    /// `Confirm` removes the entry from a copy of the collection, publishes
    /// it, and persists it. Returns the removed todo.
    pub fn resolve_delete(&mut self, decision: DeleteDecision) -> Option<Todo> {
        let id = self.pending_delete.take()?;
        if decision == DeleteDecision::Cancel {
            debug!("event=todo_delete module=controller status=cancelled todo_id={id}");
            return None;
        }

        let mut next = TodoCollection::clone(&self.todos);
        let removed = next.remove(id)?;
        self.publish(next);
        info!(
            "event=todo_delete module=controller status=ok todo_id={id} category={}",
            removed.category.as_str()
        );
        Some(removed)
    }

    /// Requests and resolves a delete in one step.
    pub fn delete_todo(&mut self, id: TodoId, decision: DeleteDecision) -> Option<Todo> {
        self.request_delete(id)?;
        self.resolve_delete(decision)
    }

    /// Todos of the active category in creation order.
    ///
    /// The iterator is lazy and can be cloned to restart. It yields nothing
    /// until the collection is loaded.
    pub fn visible_todos(&self) -> impl Iterator<Item = &Todo> + Clone + '_ {
        let loaded = self.load_state == LoadState::Loaded;
        let category = self.active_category;
        self.todos
            .iter()
            .filter(move |todo| loaded && todo.category == category)
    }

    /// Shared handle to the current collection.
    pub fn snapshot(&self) -> Arc<TodoCollection> {
        Arc::clone(&self.todos)
    }

    pub fn store(&self) -> &TodoStore<R> {
        &self.store
    }

    fn ensure_loaded(&self, event: &str) -> bool {
        if self.load_state == LoadState::Loaded {
            return true;
        }
        warn!("event={event} module=controller status=rejected reason=not_loaded");
        false
    }

    fn publish(&mut self, next: TodoCollection) {
        self.todos = Arc::new(next);
        match self.store.save(&self.todos) {
            Ok(()) => self.storage_synced = true,
            Err(err) => {
                warn!(
                    "event=controller_save module=controller status=degraded count={} error={err}",
                    self.todos.len()
                );
                self.storage_synced = false;
            }
        }
    }
}

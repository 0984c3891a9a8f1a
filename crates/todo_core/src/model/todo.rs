//! Todo domain model.
//!
//! # Responsibility
//! - Define the todo entry and its two list categories.
//! - Provide the ordered in-memory collection shared by store and controller.
//!
//! # Invariants
//! - `TodoId` values are unique within a collection and strictly increase
//!   with creation order.
//! - `text` is never empty after trimming.
//! - `category` is fixed at creation time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable identifier of a todo: creation time in Unix epoch milliseconds.
///
/// Serialized as a bare integer, which JSON object keys render as a decimal
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns an id for a todo created at `now_ms`, never colliding with
    /// `last` when two entries land in the same millisecond.
    ///
    /// Returns `None` when `last` is already `i64::MAX`.
    pub fn next(now_ms: i64, last: Option<TodoId>) -> Option<Self> {
        match last {
            Some(last) if last.0 >= now_ms => last.0.checked_add(1).map(Self),
            _ => Some(Self(now_ms)),
        }
    }

    /// Parses the decimal string form used by storage keys and FFI callers.
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<i64>().ok().map(Self)
    }
}

impl Display for TodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two mutually exclusive lists a todo can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Work list. Active when the app starts.
    #[default]
    Work,
    /// Travel wish list.
    Travel,
}

impl Category {
    /// Header label shown on the category toggle.
    pub fn label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Travel => "Travel",
        }
    }

    /// Placeholder shown in the input field while this category is active.
    pub fn input_placeholder(self) -> &'static str {
        match self {
            Self::Work => "Add a To Do",
            Self::Travel => "Where do you want to go?",
        }
    }

    /// Stable wire name (`WORK` / `TRAVEL`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Travel => "TRAVEL",
        }
    }

    /// Parses a wire name or label, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "work" => Some(Self::Work),
            "travel" => Some(Self::Travel),
            _ => None,
        }
    }
}

/// Validation failures for todo input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Text is empty or whitespace only.
    EmptyText,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "todo text must not be empty"),
        }
    }
}

impl Error for TodoValidationError {}

/// One list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub category: Category,
}

impl Todo {
    /// Creates a todo from raw user input, trimming surrounding whitespace.
    ///
    /// # Errors
    /// - `EmptyText` when nothing remains after trimming.
    pub fn new(
        id: TodoId,
        text: &str,
        category: Category,
    ) -> Result<Self, TodoValidationError> {
        let todo = Self {
            id,
            text: text.trim().to_string(),
            category,
        };
        todo.validate()?;
        Ok(todo)
    }

    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.text.trim().is_empty() {
            return Err(TodoValidationError::EmptyText);
        }
        Ok(())
    }
}

/// Ordered `TodoId -> Todo` mapping.
///
/// Iteration runs in ascending id order, which is creation order because
/// ids are monotonic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoCollection {
    items: BTreeMap<TodoId, Todo>,
}

impl TodoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.items.contains_key(&id)
    }

    /// Inserts `todo`, returning the entry previously stored under its id.
    pub fn insert(&mut self, todo: Todo) -> Option<Todo> {
        self.items.insert(todo.id, todo)
    }

    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        self.items.remove(&id)
    }

    /// Highest id in the collection, i.e. the most recently created entry.
    pub fn last_id(&self) -> Option<TodoId> {
        self.items.keys().next_back().copied()
    }

    /// Iterates all entries in creation order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Todo> + Clone + '_ {
        self.items.values()
    }

    /// Iterates entries of one category in creation order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Todo> + Clone + '_ {
        self.items
            .values()
            .filter(move |todo| todo.category == category)
    }

    /// Counts entries of one category.
    pub fn count_in(&self, category: Category) -> usize {
        self.in_category(category).count()
    }
}

impl FromIterator<Todo> for TodoCollection {
    fn from_iter<I: IntoIterator<Item = Todo>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(|todo| (todo.id, todo)).collect(),
        }
    }
}

/// Current wall clock in Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock reports a time before the epoch;
/// `TodoId::next` still keeps ids unique in that case.
pub fn epoch_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Category, Todo, TodoCollection, TodoId, TodoValidationError};

    #[test]
    fn next_id_uses_clock_when_ahead_of_last() {
        assert_eq!(TodoId::next(1_000, None), Some(TodoId::from_millis(1_000)));
        assert_eq!(
            TodoId::next(1_000, Some(TodoId::from_millis(900))),
            Some(TodoId::from_millis(1_000))
        );
    }

    #[test]
    fn next_id_bumps_past_last_on_same_millisecond() {
        let last = TodoId::from_millis(1_000);
        assert_eq!(TodoId::next(1_000, Some(last)), Some(TodoId::from_millis(1_001)));
        assert_eq!(TodoId::next(500, Some(last)), Some(TodoId::from_millis(1_001)));
    }

    #[test]
    fn next_id_is_none_when_ids_are_exhausted() {
        let last = TodoId::from_millis(i64::MAX);
        assert_eq!(TodoId::next(1_000, Some(last)), None);
    }

    #[test]
    fn new_todo_trims_and_rejects_blank_text() {
        let todo = Todo::new(TodoId::from_millis(1), "  Buy milk \n", Category::Work).unwrap();
        assert_eq!(todo.text, "Buy milk");

        let err = Todo::new(TodoId::from_millis(2), "   ", Category::Work).unwrap_err();
        assert_eq!(err, TodoValidationError::EmptyText);
    }

    #[test]
    fn category_parse_accepts_wire_names_and_labels() {
        assert_eq!(Category::parse("WORK"), Some(Category::Work));
        assert_eq!(Category::parse(" travel "), Some(Category::Travel));
        assert_eq!(Category::parse("home"), None);
        assert_eq!(Category::default(), Category::Work);
    }

    #[test]
    fn collection_iterates_in_id_order_and_filters_by_category() {
        let collection: TodoCollection = [
            Todo::new(TodoId::from_millis(30), "c", Category::Work).unwrap(),
            Todo::new(TodoId::from_millis(10), "a", Category::Work).unwrap(),
            Todo::new(TodoId::from_millis(20), "b", Category::Travel).unwrap(),
        ]
        .into_iter()
        .collect();

        let texts: Vec<&str> = collection.iter().map(|todo| todo.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);

        let work: Vec<&str> = collection
            .in_category(Category::Work)
            .map(|todo| todo.text.as_str())
            .collect();
        assert_eq!(work, vec!["a", "c"]);
        assert_eq!(collection.count_in(Category::Travel), 1);
        assert_eq!(collection.last_id(), Some(TodoId::from_millis(30)));
    }
}

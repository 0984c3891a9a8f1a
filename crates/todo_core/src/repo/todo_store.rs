//! Persistent todo store over one key-value entry.
//!
//! # Responsibility
//! - Serialize the whole `TodoCollection` into one JSON blob.
//! - Load and overwrite that blob under a fixed, namespaced key.
//!
//! # Invariants
//! - An absent blob loads as an empty collection.
//! - Serialization order is ascending id, so equal collections encode to
//!   identical bytes.
//! - Malformed blobs are reported, never partially loaded. Individual records
//!   with blank text are dropped so the rest of the list survives.
//!
//! # Storage format
//! `{"<id>": {"text": "...", "category": "WORK" | "TRAVEL"}, ...}`
//!
//! Records written before categories existed carry `"working": bool`
//! (`true` = WORK) instead of `category`; both shapes load.

use crate::model::todo::{Category, Todo, TodoCollection, TodoId};
use crate::repo::kv_repo::{KvRepository, RepoError};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Storage key holding the serialized collection.
pub const TODO_STORAGE_KEY: &str = "@todos";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying storage read/write failed.
    StorageIo(RepoError),
    /// Stored blob exists but is not a valid todo collection.
    Deserialization(String),
    /// Collection could not be encoded.
    Serialization(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageIo(err) => write!(f, "storage I/O failed: {err}"),
            Self::Deserialization(message) => {
                write!(f, "stored todo data is malformed: {message}")
            }
            Self::Serialization(err) => write!(f, "failed to encode todos: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageIo(err) => Some(err),
            Self::Deserialization(_) => None,
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::StorageIo(value)
    }
}

#[derive(Serialize)]
struct StoredTodoRef<'a> {
    text: &'a str,
    category: Category,
}

#[derive(Deserialize)]
struct StoredTodo {
    text: String,
    #[serde(default)]
    category: Option<Category>,
    #[serde(default)]
    working: Option<bool>,
}

/// Collection persistence scoped to one storage key.
pub struct TodoStore<R: KvRepository> {
    repo: R,
    key: String,
}

impl<R: KvRepository> TodoStore<R> {
    /// Creates a store under the default `@todos` key.
    pub fn new(repo: R) -> Self {
        Self::with_key(repo, TODO_STORAGE_KEY)
    }

    /// Creates a store under a caller-chosen key.
    pub fn with_key(repo: R, key: impl Into<String>) -> Self {
        Self {
            repo,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Reads the stored collection.
    ///
    /// # Errors
    /// - `StorageIo` when the read fails.
    /// - `Deserialization` when the blob is present but malformed.
    pub fn load(&self) -> StoreResult<TodoCollection> {
        let started_at = Instant::now();
        let blob = self.repo.get_item(&self.key).inspect_err(|err| {
            error!(
                "event=store_load module=store status=error error_code=storage_io error={err}"
            );
        })?;

        let Some(blob) = blob else {
            info!("event=store_load module=store status=ok found=false count=0");
            return Ok(TodoCollection::new());
        };

        let collection = decode_collection(&blob).inspect_err(|err| {
            error!(
                "event=store_load module=store status=error error_code=store_corrupt bytes={} error={err}",
                blob.len()
            );
        })?;
        info!(
            "event=store_load module=store status=ok found=true count={} duration_ms={}",
            collection.len(),
            started_at.elapsed().as_millis()
        );
        Ok(collection)
    }

    /// Overwrites the stored blob with `collection`.
    ///
    /// # Errors
    /// - `Serialization` when encoding fails.
    /// - `StorageIo` when the write fails.
    pub fn save(&self, collection: &TodoCollection) -> StoreResult<()> {
        let started_at = Instant::now();
        let blob = encode_collection(collection)?;
        self.repo.set_item(&self.key, &blob).inspect_err(|err| {
            error!(
                "event=store_save module=store status=error error_code=storage_io count={} error={err}",
                collection.len()
            );
        })?;
        info!(
            "event=store_save module=store status=ok count={} bytes={} duration_ms={}",
            collection.len(),
            blob.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Encodes a collection into the storage format.
pub fn encode_collection(collection: &TodoCollection) -> StoreResult<String> {
    let records: BTreeMap<TodoId, StoredTodoRef<'_>> = collection
        .iter()
        .map(|todo| {
            (
                todo.id,
                StoredTodoRef {
                    text: todo.text.as_str(),
                    category: todo.category,
                },
            )
        })
        .collect();
    serde_json::to_string(&records).map_err(StoreError::Serialization)
}

/// Decodes the storage format, accepting legacy `working` records.
///
/// Records whose text is blank are dropped with a warning; the rest of the
/// collection still loads.
///
/// # Errors
/// - `Deserialization` on invalid JSON, non-numeric keys, an unknown
///   category, or a record with neither `category` nor `working`.
pub fn decode_collection(blob: &str) -> StoreResult<TodoCollection> {
    let records: BTreeMap<TodoId, StoredTodo> =
        serde_json::from_str(blob).map_err(|err| StoreError::Deserialization(err.to_string()))?;

    let mut collection = TodoCollection::new();
    for (id, record) in records {
        let category = match (record.category, record.working) {
            (Some(category), _) => category,
            (None, Some(true)) => Category::Work,
            (None, Some(false)) => Category::Travel,
            (None, None) => {
                return Err(StoreError::Deserialization(format!(
                    "todo {id} has no category"
                )));
            }
        };
        let todo = Todo {
            id,
            text: record.text,
            category,
        };
        if let Err(err) = todo.validate() {
            warn!(
                "event=store_decode module=store status=skipped todo_id={id} reason=\"{err}\""
            );
            continue;
        }
        collection.insert(todo);
    }
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::{decode_collection, encode_collection, StoreError};
    use crate::model::todo::{Category, Todo, TodoCollection, TodoId};

    fn todo(id: i64, text: &str, category: Category) -> Todo {
        Todo::new(TodoId::from_millis(id), text, category).unwrap()
    }

    #[test]
    fn encode_uses_id_keys_and_wire_category_names() {
        let collection: TodoCollection = [
            todo(1_700_000_000_002, "Lisbon", Category::Travel),
            todo(1_700_000_000_001, "Buy milk", Category::Work),
        ]
        .into_iter()
        .collect();

        let blob = encode_collection(&collection).unwrap();
        assert_eq!(
            blob,
            r#"{"1700000000001":{"text":"Buy milk","category":"WORK"},"1700000000002":{"text":"Lisbon","category":"TRAVEL"}}"#
        );
    }

    #[test]
    fn decode_accepts_legacy_working_flag() {
        let blob = r#"{"1":{"text":"ship it","working":true},"2":{"text":"Seoul","working":false}}"#;
        let collection = decode_collection(blob).unwrap();
        assert_eq!(
            collection.get(TodoId::from_millis(1)).unwrap().category,
            Category::Work
        );
        assert_eq!(
            collection.get(TodoId::from_millis(2)).unwrap().category,
            Category::Travel
        );
    }

    #[test]
    fn decode_rejects_malformed_blobs() {
        for blob in [
            "not json",
            "[]",
            r#"{"abc":{"text":"x","category":"WORK"}}"#,
            r#"{"1":{"text":"x","category":"HOME"}}"#,
            r#"{"1":{"text":"x"}}"#,
        ] {
            let err = decode_collection(blob).unwrap_err();
            assert!(
                matches!(err, StoreError::Deserialization(_)),
                "blob {blob} should be rejected"
            );
        }
    }

    #[test]
    fn decode_drops_blank_records_and_keeps_the_rest() {
        let blob = r#"{"1":{"text":"  ","category":"WORK"},"2":{"text":"keep","category":"TRAVEL"}}"#;
        let collection = decode_collection(blob).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(TodoId::from_millis(2)).unwrap().text, "keep");
    }

    #[test]
    fn decode_empty_object_is_empty_collection() {
        assert!(decode_collection("{}").unwrap().is_empty());
    }
}

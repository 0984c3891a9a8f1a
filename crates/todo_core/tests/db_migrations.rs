use rusqlite::Connection;
use todo_core::db::migrations::latest_version;
use todo_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_store");
}

#[test]
fn reopening_file_database_keeps_schema_and_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.sqlite3");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO kv_store (key, value) VALUES ('@todos', '{}');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let value: String = second
        .query_row("SELECT value FROM kv_store WHERE key = '@todos';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(value, "{}");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn kv_store_rejects_blank_keys_at_schema_level() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('   ', 'x');",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

#[test]
fn opening_path_in_missing_directory_reports_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("todos.sqlite3");

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_open_failed");
    match err {
        DbError::Open { target, .. } => assert_eq!(target, path.display().to_string()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failing_schema_step_reports_its_version_and_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clash.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE other (x INTEGER);
         CREATE INDEX kv_store ON other (x);",
    )
    .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_migration_failed");
    assert!(matches!(err, DbError::Migration { version: 1, .. }));

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
}

use confs_core::db::migrations::latest_version;
use confs_core::db::{open_db, open_db_in_memory, ping_db, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "confs");
    ping_db(&conn).unwrap();
}

#[test]
fn confs_table_carries_every_column() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn.prepare("PRAGMA table_info(confs);").unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(1))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(columns.len(), 23);
    assert_eq!(columns.first().map(String::as_str), Some("id"));
    assert!(columns.iter().any(|column| column == "details"));
}

#[test]
fn details_column_rejects_invalid_json() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO confs (title, added_by, start_date, end_date, details)
         VALUES ('bad', 1, 0, 0, '{\"open\": ');",
        [],
    );
    let err = DbError::from(result.unwrap_err());
    assert!(err.is_constraint_violation(), "unexpected error: {err}");
}

#[test]
fn missing_table_is_not_a_constraint_violation() {
    let conn = open_db_in_memory().unwrap();

    let err = DbError::from(conn.execute("DELETE FROM no_such_table;", []).unwrap_err());
    assert!(!err.is_constraint_violation());
    assert!(err.to_string().starts_with("conference store error:"));
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("confs.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    conn_first
        .execute(
            "INSERT INTO confs (title, added_by, start_date, end_date) VALUES ('kept', 1, 0, 0);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM confs;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

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
fn opening_unreachable_path_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("confs.db");

    assert!(matches!(open_db(&path), Err(DbError::Sqlite(_))));
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

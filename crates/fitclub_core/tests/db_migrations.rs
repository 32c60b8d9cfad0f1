use fitclub_core::db::migrations::latest_version;
use fitclub_core::db::{open_db, open_db_in_memory, DbError};
use fitclub_core::{RepoError, SqliteRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "movements",
        "meals",
        "programs",
        "program_movements",
        "diets",
        "diet_meals",
        "members",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitclub.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "members");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
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
fn catalog_only_database_is_upgraded_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog-only.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_catalog.sql"))
        .unwrap();
    conn.execute_batch(
        "PRAGMA user_version = 1;
         INSERT INTO movements (uuid, name, video) VALUES ('m1', 'Squat', 'https://v.example.com/s');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "members");
    let kept: i64 = conn
        .query_row("SELECT COUNT(*) FROM movements;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(kept, 1);
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let result = SqliteRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
}

#[test]
fn repository_rejects_schema_missing_a_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE movements (uuid TEXT PRIMARY KEY);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();

    let result = SqliteRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "movements",
            column: "name",
        })
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "missing table `{table_name}`");
}

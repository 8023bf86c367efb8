use contactbook_core::db::schema::SCHEMA_VERSION;
use contactbook_core::db::{open_db, open_db_in_memory, DbError};
use contactbook_core::{ContactDraft, ContactStore, SqliteContactStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_table_exists(&conn, "contacts");
    assert_index_exists(&conn, "idx_contacts_external_id");
    assert_index_exists(&conn, "idx_contacts_name");
}

#[test]
fn reopening_file_keeps_rows_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");

    let conn = open_db(&path).unwrap();
    SqliteContactStore::new(&conn)
        .insert(&ContactDraft::new("Ann", "111"))
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    let contacts = SqliteContactStore::new(&conn).list_all().unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].name, "Ann");
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("contacts.db");

    open_db(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn file_databases_use_wal_and_full_sync() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("contacts.db")).unwrap();

    let journal_mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    let synchronous: i64 = conn
        .query_row("PRAGMA synchronous;", [], |row| row.get(0))
        .unwrap();

    assert_eq!(journal_mode.to_ascii_lowercase(), "wal");
    assert_eq!(synchronous, 2);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 7;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            supported,
        } => {
            assert_eq!(db_version, 7);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, name: &str) {
    assert!(
        sqlite_master_has(conn, "table", name),
        "table {name} does not exist"
    );
}

fn assert_index_exists(conn: &Connection, name: &str) {
    assert!(
        sqlite_master_has(conn, "index", name),
        "index {name} does not exist"
    );
}

fn sqlite_master_has(conn: &Connection, kind: &str, name: &str) -> bool {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = ?1 AND name = ?2
        );",
        [kind, name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}

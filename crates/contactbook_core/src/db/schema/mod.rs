//! Fixed contact schema.
//!
//! # Responsibility
//! - Create the `contacts` table and its indexes when absent.
//! - Refuse databases written by a newer schema.
//!
//! # Invariants
//! - There is exactly one schema version; no migrations are applied.
//! - `PRAGMA user_version` is set to [`SCHEMA_VERSION`] once the schema exists.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// The only schema version this binary reads or writes.
pub const SCHEMA_VERSION: u32 = 1;

const CONTACTS_SQL: &str = include_str!("contacts.sql");

/// Ensures the contact schema exists on `conn`.
///
/// Safe to call on every open: table and index creation is idempotent.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current = current_user_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.transaction()?;
    tx.execute_batch(CONTACTS_SQL)?;
    if current < SCHEMA_VERSION {
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

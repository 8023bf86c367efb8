//! Contact store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `contacts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every list read is ordered by `name ASC, id ASC`.
//! - Update and delete report missing rows as `NotFound` instead of
//!   silently doing nothing.
//! - A repeated external id on insert is reported as `Conflict`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::contact::{ContactDraft, ContactId, ContactRecord, ExternalId};
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    name,
    phone_number,
    image_uri,
    external_id
FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for contact persistence, query and store lifecycle operations.
#[derive(Debug)]
pub enum RepoError {
    /// Storage failure (I/O, durability, SQL).
    Db(DbError),
    /// Insert carried an external id that is already stored.
    Conflict { external_id: ExternalId },
    /// Update or delete targeted an id with no row.
    NotFound(ContactId),
    /// Persisted row could not be mapped to a record.
    InvalidData(String),
    /// The store worker has shut down.
    StoreClosed,
    /// A store is already open with a different location.
    ConfigMismatch {
        active: PathBuf,
        requested: PathBuf,
    },
}

impl RepoError {
    /// Returns whether this error is a duplicate-import conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict { external_id } => {
                write!(f, "contact already imported: external id {external_id}")
            }
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::StoreClosed => write!(f, "contact store is closed"),
            Self::ConfigMismatch { active, requested } => write!(
                f,
                "contact store already open at `{}`; refusing to switch to `{}`",
                active.display(),
                requested.display()
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for contact storage.
pub trait ContactStore {
    fn insert(&self, draft: &ContactDraft) -> RepoResult<ContactId>;
    fn update(&self, record: &ContactRecord) -> RepoResult<()>;
    fn delete(&self, id: ContactId) -> RepoResult<()>;
    fn get(&self, id: ContactId) -> RepoResult<Option<ContactRecord>>;
    fn list_all(&self) -> RepoResult<Vec<ContactRecord>>;
    fn imported_external_ids(&self) -> RepoResult<BTreeSet<ExternalId>>;
}

/// SQLite-backed contact store.
pub struct SqliteContactStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ContactStore for SqliteContactStore<'_> {
    fn insert(&self, draft: &ContactDraft) -> RepoResult<ContactId> {
        let inserted = self.conn.execute(
            "INSERT INTO contacts (
                name,
                phone_number,
                image_uri,
                external_id
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.name.as_str(),
                draft.phone_number.as_str(),
                draft.image_uri.as_deref(),
                draft.external_id,
            ],
        );

        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => match draft.external_id {
                Some(external_id) => Err(RepoError::Conflict { external_id }),
                None => Err(err.into()),
            },
            Err(err) => Err(err.into()),
        }
    }

    fn update(&self, record: &ContactRecord) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                name = ?1,
                phone_number = ?2,
                image_uri = ?3
             WHERE id = ?4;",
            params![
                record.name.as_str(),
                record.phone_number.as_str(),
                record.image_uri.as_deref(),
                record.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(record.id));
        }

        Ok(())
    }

    fn delete(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get(&self, id: ContactId) -> RepoResult<Option<ContactRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(parse_contact_row(row)))
            .optional()?;

        row.transpose()
    }

    fn list_all(&self) -> RepoResult<Vec<ContactRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }

    fn imported_external_ids(&self) -> RepoResult<BTreeSet<ExternalId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT external_id FROM contacts WHERE external_id IS NOT NULL;")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, ExternalId>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(ids)
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<ContactRecord> {
    let id: ContactId = row.get("id")?;
    let name: Option<String> = row.get("name")?;
    let name = name.ok_or_else(|| {
        RepoError::InvalidData(format!("null name in contacts.name for id {id}"))
    })?;

    Ok(ContactRecord {
        id,
        name,
        phone_number: row.get::<_, Option<String>>("phone_number")?.unwrap_or_default(),
        image_uri: row.get("image_uri")?,
        external_id: row.get("external_id")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

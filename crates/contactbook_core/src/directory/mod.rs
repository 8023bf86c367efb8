//! External contact directory interface.
//!
//! # Responsibility
//! - Describe the read-only device directory the importer consumes.
//!
//! # Invariants
//! - Implementations never mutate directory state through this trait.
//! - `phone_numbers` may return zero, one or many numbers per entry; callers
//!   pick the first.

use crate::model::contact::ExternalId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod memory;

pub use memory::{DirectoryRecord, InMemoryDirectory};

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Directory query failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Directory cannot be read at all (for example, access was revoked).
    Unavailable(String),
    /// A single query failed; other queries may still succeed.
    Query(String),
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "contact directory unavailable: {reason}"),
            Self::Query(reason) => write!(f, "contact directory query failed: {reason}"),
        }
    }
}

impl Error for DirectoryError {}

/// One directory entry as listed by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub external_id: ExternalId,
    pub display_name: String,
    /// Whether the directory claims at least one number exists.
    pub has_phone_number: bool,
}

/// Read-only source of directory entries.
pub trait DirectorySource: Send + Sync {
    /// Lists every entry, in no particular order.
    fn entries(&self) -> DirectoryResult<Vec<DirectoryEntry>>;

    /// Looks up the phone numbers of one entry.
    fn phone_numbers(&self, external_id: ExternalId) -> DirectoryResult<Vec<String>>;
}

impl<T: DirectorySource + ?Sized> DirectorySource for Arc<T> {
    fn entries(&self) -> DirectoryResult<Vec<DirectoryEntry>> {
        (**self).entries()
    }

    fn phone_numbers(&self, external_id: ExternalId) -> DirectoryResult<Vec<String>> {
        (**self).phone_numbers(external_id)
    }
}

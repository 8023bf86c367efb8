use super::ImportSelection;
use crate::directory::DirectoryError;
use crate::model::contact::{ContactDraft, ContactId, ExternalId};

/// A directory entry offered for import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateContact {
    pub external_id: ExternalId,
    pub name: String,
    /// First number reported by the directory, or empty.
    pub phone_number: String,
    /// A stored contact already carries this external id.
    pub already_imported: bool,
}

impl CandidateContact {
    /// Insert request for this candidate, tagged with its external id.
    pub fn to_draft(&self) -> ContactDraft {
        ContactDraft::new(self.name.clone(), self.phone_number.clone())
            .with_external_id(self.external_id)
    }
}

/// Result of reading the directory.
///
/// When the directory cannot be read, `candidates` is empty and
/// `source_error` says why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateListing {
    /// Sorted by `name ASC, external_id ASC`.
    pub candidates: Vec<CandidateContact>,
    pub source_error: Option<DirectoryError>,
}

impl CandidateListing {
    pub fn is_available(&self) -> bool {
        self.source_error.is_none()
    }

    /// Starts an empty selection over these candidates.
    pub fn into_selection(self) -> ImportSelection {
        ImportSelection::new(self.candidates)
    }
}

/// One candidate that could not be imported for a reason other than being a
/// duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    pub external_id: ExternalId,
    pub reason: String,
}

/// Per-item outcome of an import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Ids of newly stored contacts, in selection order.
    pub inserted: Vec<ContactId>,
    /// External ids skipped because they were already stored.
    pub skipped: Vec<ExternalId>,
    pub failed: Vec<ImportFailure>,
}

impl ImportReport {
    /// Number of candidates the batch was asked to import.
    pub fn requested(&self) -> usize {
        self.inserted.len() + self.skipped.len() + self.failed.len()
    }

    /// Returns whether no candidate failed (skips are not failures).
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

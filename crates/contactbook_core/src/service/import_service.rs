//! Directory import use-case service.
//!
//! # Responsibility
//! - Read the external directory into sorted, deduplicated candidates.
//! - Commit a user selection into the contact store.
//!
//! # Invariants
//! - Candidates without a resolvable phone number are kept with an empty
//!   number, never dropped.
//! - An unavailable directory yields an empty listing, not a failure.
//! - Import batches are not atomic; duplicates are skipped and other
//!   per-item failures never stop the remaining items.

use crate::directory::{DirectoryEntry, DirectoryError, DirectorySource};
use crate::import::{CandidateContact, CandidateListing, ImportFailure, ImportReport};
use crate::model::contact::ExternalId;
use crate::repo::contact_store::RepoResult;
use crate::service::contact_service::ContactService;
use log::{info, warn};
use std::collections::BTreeSet;
use std::time::Instant;

/// Reconciles an external directory against the contact store.
pub struct ImportReconciler<D: DirectorySource> {
    source: D,
    contacts: ContactService,
}

impl<D: DirectorySource> ImportReconciler<D> {
    pub fn new(source: D, contacts: ContactService) -> Self {
        Self { source, contacts }
    }

    /// Lists every directory entry as an import candidate.
    ///
    /// Candidates are sorted by `name ASC, external_id ASC`, each external id
    /// appears once, and `already_imported` reflects the latest published
    /// snapshot.
    pub fn list_candidates(&self) -> CandidateListing {
        let started_at = Instant::now();
        match self.read_candidates() {
            Ok(candidates) => {
                info!(
                    "event=import_list module=import status=ok count={} duration_ms={}",
                    candidates.len(),
                    started_at.elapsed().as_millis()
                );
                CandidateListing {
                    candidates,
                    source_error: None,
                }
            }
            Err(err) => {
                warn!(
                    "event=import_list module=import status=error error_code=source_unavailable error={}",
                    err
                );
                CandidateListing {
                    candidates: Vec::new(),
                    source_error: Some(err),
                }
            }
        }
    }

    /// Inserts one contact per selected candidate.
    ///
    /// Candidates whose external id is already stored are reported as
    /// skipped. Returns an error only when the batch could not be submitted.
    pub async fn import_selected(
        &self,
        selected: Vec<CandidateContact>,
    ) -> RepoResult<ImportReport> {
        let started_at = Instant::now();
        let drafts = selected.iter().map(CandidateContact::to_draft).collect();
        let outcomes = self.contacts.insert_many(drafts).await?;

        let mut report = ImportReport::default();
        for (candidate, outcome) in selected.iter().zip(outcomes) {
            match outcome {
                Ok(id) => report.inserted.push(id),
                Err(err) if err.is_conflict() => report.skipped.push(candidate.external_id),
                Err(err) => report.failed.push(ImportFailure {
                    external_id: candidate.external_id,
                    reason: err.to_string(),
                }),
            }
        }

        info!(
            "event=import_commit module=import status={} requested={} inserted={} skipped={} failed={} duration_ms={}",
            if report.is_clean() { "ok" } else { "partial" },
            report.requested(),
            report.inserted.len(),
            report.skipped.len(),
            report.failed.len(),
            started_at.elapsed().as_millis()
        );

        Ok(report)
    }

    fn read_candidates(&self) -> Result<Vec<CandidateContact>, DirectoryError> {
        let imported = self.contacts.store().snapshot().external_ids();
        let mut seen = BTreeSet::new();
        let mut candidates = Vec::new();

        for entry in self.source.entries()? {
            if !seen.insert(entry.external_id) {
                continue;
            }
            let phone_number = self.resolve_phone_number(&entry)?;
            candidates.push(CandidateContact {
                external_id: entry.external_id,
                already_imported: imported.contains(&entry.external_id),
                name: entry.display_name,
                phone_number,
            });
        }

        candidates.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.external_id.cmp(&b.external_id))
        });
        Ok(candidates)
    }

    /// First number of `entry`, or empty when it has none.
    ///
    /// A failed lookup for one entry degrades to an empty number; only
    /// revoked access aborts the listing.
    fn resolve_phone_number(&self, entry: &DirectoryEntry) -> Result<String, DirectoryError> {
        if !entry.has_phone_number {
            return Ok(String::new());
        }

        match self.source.phone_numbers(entry.external_id) {
            Ok(numbers) => Ok(numbers.into_iter().next().unwrap_or_default()),
            Err(err @ DirectoryError::Unavailable(_)) => Err(err),
            Err(DirectoryError::Query(reason)) => {
                log_lookup_failure(entry.external_id, &reason);
                Ok(String::new())
            }
        }
    }
}

fn log_lookup_failure(external_id: ExternalId, reason: &str) {
    warn!(
        "event=import_phone_lookup module=import status=error external_id={} error={}",
        external_id, reason
    );
}

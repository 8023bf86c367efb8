use super::{DirectoryEntry, DirectoryError, DirectoryResult, DirectorySource};
use crate::model::contact::ExternalId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Serializable directory entry with its phone numbers inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub external_id: ExternalId,
    pub display_name: String,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    /// Overrides the has-number flag derived from `phone_numbers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_phone_number: Option<bool>,
}

impl DirectoryRecord {
    pub fn new(external_id: ExternalId, display_name: impl Into<String>) -> Self {
        Self {
            external_id,
            display_name: display_name.into(),
            phone_numbers: Vec::new(),
            has_phone_number: None,
        }
    }

    pub fn with_phone_number(mut self, number: impl Into<String>) -> Self {
        self.phone_numbers.push(number.into());
        self
    }

    fn declares_phone_number(&self) -> bool {
        self.has_phone_number
            .unwrap_or(!self.phone_numbers.is_empty())
    }
}

/// Directory held in memory, used for fixtures and JSON exports.
///
/// Availability can be switched off to mimic revoked directory access.
#[derive(Debug)]
pub struct InMemoryDirectory {
    records: Vec<DirectoryRecord>,
    available: AtomicBool,
}

impl InMemoryDirectory {
    pub fn new(records: Vec<DirectoryRecord>) -> Self {
        Self {
            records,
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> DirectoryResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(DirectoryError::Unavailable(
                "directory access revoked".to_string(),
            ))
        }
    }
}

impl DirectorySource for InMemoryDirectory {
    fn entries(&self) -> DirectoryResult<Vec<DirectoryEntry>> {
        self.ensure_available()?;
        Ok(self
            .records
            .iter()
            .map(|record| DirectoryEntry {
                external_id: record.external_id,
                display_name: record.display_name.clone(),
                has_phone_number: record.declares_phone_number(),
            })
            .collect())
    }

    fn phone_numbers(&self, external_id: ExternalId) -> DirectoryResult<Vec<String>> {
        self.ensure_available()?;
        Ok(self
            .records
            .iter()
            .find(|record| record.external_id == external_id)
            .map(|record| record.phone_numbers.clone())
            .unwrap_or_default())
    }
}

//! Contact domain model.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never reused.
//! - `external_id` records import provenance and is unique among imported
//!   contacts; manually created contacts carry `None`.
//! - Name and phone number are stored as given, without validation.

use serde::{Deserialize, Serialize};

/// Store-generated contact identifier.
pub type ContactId = i64;

/// Identifier of an entry in the external contact directory.
pub type ExternalId = i64;

/// A persisted contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: ContactId,
    /// Display name. Sort key for every read.
    pub name: String,
    /// Free-form number, may be empty.
    pub phone_number: String,
    /// Opaque reference to a locally accessible image.
    pub image_uri: Option<String>,
    /// Directory entry this contact was imported from.
    pub external_id: Option<ExternalId>,
}

impl ContactRecord {
    /// Builds the record a store would hold after inserting `draft` as `id`.
    pub fn from_draft(id: ContactId, draft: ContactDraft) -> Self {
        Self {
            id,
            name: draft.name,
            phone_number: draft.phone_number,
            image_uri: draft.image_uri,
            external_id: draft.external_id,
        }
    }
}

/// Insert request for a new contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: String,
    pub phone_number: String,
    pub image_uri: Option<String>,
    pub external_id: Option<ExternalId>,
}

impl ContactDraft {
    /// Creates a manual (non-imported) contact draft without an image.
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            image_uri: None,
            external_id: None,
        }
    }

    pub fn with_image_uri(mut self, image_uri: impl Into<String>) -> Self {
        self.image_uri = Some(image_uri.into());
        self
    }

    /// Marks the draft as imported from directory entry `external_id`.
    pub fn with_external_id(mut self, external_id: ExternalId) -> Self {
        self.external_id = Some(external_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactDraft, ContactRecord};

    #[test]
    fn from_draft_keeps_every_field() {
        let draft = ContactDraft::new("Ann", "111")
            .with_image_uri("content://images/7")
            .with_external_id(42);
        let record = ContactRecord::from_draft(9, draft);

        assert_eq!(record.id, 9);
        assert_eq!(record.name, "Ann");
        assert_eq!(record.phone_number, "111");
        assert_eq!(record.image_uri.as_deref(), Some("content://images/7"));
        assert_eq!(record.external_id, Some(42));
    }
}

//! Core persistence and synchronization logic for Contactbook.
//! This crate is the single source of truth for contact storage invariants.

pub mod db;
pub mod directory;
pub mod feed;
pub mod import;
pub mod logging;
pub mod model;
pub mod quick_action;
pub mod repo;
pub mod service;
pub mod store;

pub use directory::{
    DirectoryEntry, DirectoryError, DirectoryRecord, DirectoryResult, DirectorySource,
    InMemoryDirectory,
};
pub use feed::{ContactFeed, ContactSnapshot};
pub use import::{CandidateContact, CandidateListing, ImportFailure, ImportReport, ImportSelection};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::contact::{ContactDraft, ContactId, ContactRecord, ExternalId};
pub use quick_action::{dial_uri, message_uri};
pub use repo::contact_store::{ContactStore, RepoError, RepoResult, SqliteContactStore};
pub use service::contact_service::ContactService;
pub use service::import_service::ImportReconciler;
pub use store::{StoreCell, StoreConfig, StoreHandle, StoreLocation};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

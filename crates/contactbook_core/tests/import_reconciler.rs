use contactbook_core::{
    CandidateContact, ContactDraft, ContactService, DirectoryEntry, DirectoryError,
    DirectoryRecord, DirectoryResult, DirectorySource, ExternalId, ImportReconciler,
    InMemoryDirectory, StoreConfig, StoreHandle,
};
use std::sync::Arc;

fn service() -> ContactService {
    ContactService::new(StoreHandle::open(&StoreConfig::in_memory()).unwrap())
}

fn zed_and_amy() -> InMemoryDirectory {
    InMemoryDirectory::new(vec![
        DirectoryRecord::new(1, "Zed").with_phone_number("999"),
        DirectoryRecord::new(2, "Amy").with_phone_number("888"),
    ])
}

fn names(contacts: &[contactbook_core::ContactRecord]) -> Vec<&str> {
    contacts.iter().map(|contact| contact.name.as_str()).collect()
}

#[tokio::test]
async fn select_all_import_then_reimport_scenario() {
    let service = service();
    let reconciler = ImportReconciler::new(zed_and_amy(), service.clone());

    let mut selection = reconciler.list_candidates().into_selection();
    selection.set_all(true);
    let report = reconciler
        .import_selected(selection.selected_candidates())
        .await
        .unwrap();
    assert_eq!(report.inserted.len(), 2);
    assert!(report.skipped.is_empty());

    let snapshot = service.observe_all().current();
    assert_eq!(names(&snapshot.contacts), vec!["Amy", "Zed"]);
    assert_eq!(snapshot.contacts[0].phone_number, "888");
    assert_eq!(snapshot.contacts[0].external_id, Some(2));

    let mut again = reconciler.list_candidates().into_selection();
    assert!(again.candidates().iter().all(|c| c.already_imported));
    again.set_all(true);
    let report = reconciler
        .import_selected(again.selected_candidates())
        .await
        .unwrap();

    assert!(report.inserted.is_empty());
    assert_eq!(report.skipped, vec![2, 1]);
    assert!(report.is_clean());
    assert_eq!(service.list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn partial_overlap_imports_only_new_candidates() {
    let service = service();
    let directory = InMemoryDirectory::new(
        (1..=5)
            .map(|n| DirectoryRecord::new(n, format!("Person {n}")).with_phone_number(n.to_string()))
            .collect(),
    );
    let reconciler = ImportReconciler::new(directory, service.clone());

    let first = reconciler.list_candidates().candidates;
    reconciler
        .import_selected(vec![first[1].clone(), first[3].clone()])
        .await
        .unwrap();

    let mut selection = reconciler.list_candidates().into_selection();
    selection.set_all(true);
    let report = reconciler
        .import_selected(selection.selected_candidates())
        .await
        .unwrap();

    assert_eq!(report.requested(), 5);
    assert_eq!(report.inserted.len(), 3);
    assert_eq!(report.skipped.len(), 2);
    assert!(report.failed.is_empty());
    assert_eq!(service.list_all().await.unwrap().len(), 5);
}

#[tokio::test]
async fn imported_contacts_coexist_with_manual_ones() {
    let service = service();
    service
        .insert(ContactDraft::new("Zed", "999"))
        .await
        .unwrap();
    let reconciler = ImportReconciler::new(zed_and_amy(), service.clone());

    let listing = reconciler.list_candidates();
    assert!(listing.candidates.iter().all(|c| !c.already_imported));

    let report = reconciler
        .import_selected(listing.candidates)
        .await
        .unwrap();
    assert_eq!(report.inserted.len(), 2);
    assert_eq!(names(&service.list_all().await.unwrap()), vec!["Amy", "Zed", "Zed"]);
}

#[tokio::test]
async fn duplicate_candidates_in_one_batch_are_skipped_not_failed() {
    let service = service();
    let reconciler = ImportReconciler::new(zed_and_amy(), service.clone());

    let zed = reconciler
        .list_candidates()
        .candidates
        .into_iter()
        .find(|c| c.external_id == 1)
        .unwrap();
    let report = reconciler
        .import_selected(vec![zed.clone(), zed])
        .await
        .unwrap();

    assert_eq!(report.inserted.len(), 1);
    assert_eq!(report.skipped, vec![1]);
}

#[test]
fn candidates_are_sorted_and_deduplicated() {
    let directory = InMemoryDirectory::new(vec![
        DirectoryRecord::new(3, "Cat"),
        DirectoryRecord::new(1, "Bea"),
        DirectoryRecord::new(2, "Bea"),
        DirectoryRecord::new(1, "Bea duplicate"),
    ]);
    let reconciler = ImportReconciler::new(directory, service());

    let listed: Vec<_> = reconciler
        .list_candidates()
        .candidates
        .into_iter()
        .map(|c| (c.name, c.external_id))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("Bea".to_string(), 1),
            ("Bea".to_string(), 2),
            ("Cat".to_string(), 3),
        ]
    );
}

#[test]
fn candidates_without_numbers_are_kept_with_empty_number() {
    let mut declared_but_missing = DirectoryRecord::new(2, "Ben");
    declared_but_missing.has_phone_number = Some(true);
    let directory = InMemoryDirectory::new(vec![
        DirectoryRecord::new(1, "Ada"),
        declared_but_missing,
        DirectoryRecord::new(3, "Cy")
            .with_phone_number("111")
            .with_phone_number("222"),
    ]);
    let reconciler = ImportReconciler::new(directory, service());

    let numbers: Vec<_> = reconciler
        .list_candidates()
        .candidates
        .into_iter()
        .map(|c| c.phone_number)
        .collect();
    assert_eq!(numbers, vec!["", "", "111"]);
}

#[tokio::test]
async fn unavailable_source_yields_empty_listing_with_error() {
    let service = service();
    let directory = Arc::new(zed_and_amy());
    directory.set_available(false);
    let reconciler = ImportReconciler::new(Arc::clone(&directory), service.clone());

    let listing = reconciler.list_candidates();
    assert!(listing.candidates.is_empty());
    assert!(!listing.is_available());
    assert!(matches!(
        listing.source_error,
        Some(DirectoryError::Unavailable(_))
    ));

    let mut selection = listing.into_selection();
    selection.set_all(true);
    let report = reconciler
        .import_selected(selection.selected_candidates())
        .await
        .unwrap();
    assert_eq!(report.requested(), 0);
    assert!(service.list_all().await.unwrap().is_empty());

    directory.set_available(true);
    assert_eq!(reconciler.list_candidates().candidates.len(), 2);
}

/// Directory whose phone lookups fail for one entry and whose access can be
/// revoked between the listing and the lookups.
struct FlakyDirectory {
    revoke_on_lookup: bool,
}

impl DirectorySource for FlakyDirectory {
    fn entries(&self) -> DirectoryResult<Vec<DirectoryEntry>> {
        Ok(vec![
            DirectoryEntry {
                external_id: 1,
                display_name: "Ann".to_string(),
                has_phone_number: true,
            },
            DirectoryEntry {
                external_id: 2,
                display_name: "Bob".to_string(),
                has_phone_number: true,
            },
        ])
    }

    fn phone_numbers(&self, external_id: ExternalId) -> DirectoryResult<Vec<String>> {
        if self.revoke_on_lookup {
            return Err(DirectoryError::Unavailable("revoked".to_string()));
        }
        match external_id {
            1 => Err(DirectoryError::Query("cursor failed".to_string())),
            _ => Ok(vec!["222".to_string()]),
        }
    }
}

#[test]
fn failed_phone_lookup_keeps_candidate() {
    let reconciler = ImportReconciler::new(
        FlakyDirectory {
            revoke_on_lookup: false,
        },
        service(),
    );

    let candidates: Vec<CandidateContact> = reconciler.list_candidates().candidates;
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].phone_number, "");
    assert_eq!(candidates[1].phone_number, "222");
}

#[test]
fn access_revoked_mid_listing_yields_empty_listing() {
    let reconciler = ImportReconciler::new(
        FlakyDirectory {
            revoke_on_lookup: true,
        },
        service(),
    );

    let listing = reconciler.list_candidates();
    assert!(listing.candidates.is_empty());
    assert!(matches!(
        listing.source_error,
        Some(DirectoryError::Unavailable(_))
    ));
}

#[tokio::test]
async fn import_into_closed_store_is_an_error() {
    let service = service();
    let reconciler = ImportReconciler::new(zed_and_amy(), service.clone());
    let candidates = reconciler.list_candidates().candidates;

    service.store().close().await.unwrap();

    assert!(reconciler.import_selected(candidates).await.is_err());
}

#[test]
fn directory_fixture_deserializes_from_json() {
    let records: Vec<DirectoryRecord> = serde_json::from_str(
        r#"[
            { "external_id": 1, "display_name": "Zed", "phone_numbers": ["999"] },
            { "external_id": 2, "display_name": "Amy" }
        ]"#,
    )
    .unwrap();

    let directory = InMemoryDirectory::new(records);
    let entries = directory.entries().unwrap();
    assert!(entries[0].has_phone_number);
    assert!(!entries[1].has_phone_number);
}

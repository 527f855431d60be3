use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use super::common::*;
use crate::inspections::domain::ChecklistKind;
use crate::inspections::records::RecordQuery;
use crate::inspections::service::InspectionService;

fn service_with_counting_store() -> (
    Arc<
        InspectionService<
            crate::inspections::infra::InMemoryTemplateStore,
            CountingRecordStore,
            crate::directory::InMemoryVehicleDirectory,
            crate::directory::InMemoryRoleDirectory,
        >,
    >,
    Arc<CountingRecordStore>,
) {
    let templates = Arc::new(crate::inspections::infra::InMemoryTemplateStore::new());
    let records = Arc::new(CountingRecordStore::new());
    let vehicles = Arc::new(fleet_directory());
    let roles = Arc::new(roles_directory());
    let service = Arc::new(InspectionService::new(
        templates,
        records.clone(),
        vehicles,
        roles,
    ));
    (service, records)
}

#[test]
fn create_assigns_folio_and_timestamp_and_strips_caller_values() {
    let service = build_service();

    let mut draft = sample_draft(assigned_vehicle_id(), "https://files.test/evidencia.jpg");
    draft.folio = Some("FORGED-999".to_string());
    draft.inspected_at = Some(Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap());

    let record = service.create_record(draft).expect("record creates");

    assert_eq!(record.folio, "INS-00001");
    assert!(
        record.inspected_at.date_naive() > NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        "the store assigns its own timestamp"
    );

    let second = service
        .create_record(sample_draft(
            assigned_vehicle_id(),
            "https://files.test/evidencia2.jpg",
        ))
        .expect("record creates");
    assert_eq!(second.folio, "INS-00002", "folios are sequential");
}

#[test]
fn filters_are_conjunctive() {
    let service = build_service();
    let mut express = sample_draft(assigned_vehicle_id(), "https://files.test/e1.jpg");
    express.kind = ChecklistKind::Express;
    let mut completo = sample_draft(assigned_vehicle_id(), "https://files.test/e2.jpg");
    completo.kind = ChecklistKind::Completo;
    let mut other_vehicle = sample_draft(unassigned_vehicle_id(), "https://files.test/e3.jpg");
    other_vehicle.kind = ChecklistKind::Express;

    service.create_record(express).expect("record creates");
    service.create_record(completo).expect("record creates");
    service.create_record(other_vehicle).expect("record creates");

    let rows = service
        .list_records(&RecordQuery {
            kind: Some(ChecklistKind::Express),
            vehicle_id: Some(assigned_vehicle_id()),
            ..RecordQuery::default()
        })
        .expect("listing succeeds");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, ChecklistKind::Express);
    assert_eq!(rows[0].vehicle_id, assigned_vehicle_id());
}

#[test]
fn economic_number_matches_by_substring_against_the_vehicle() {
    let service = build_service();
    service
        .create_record(sample_draft(
            assigned_vehicle_id(),
            "https://files.test/e1.jpg",
        ))
        .expect("record creates");
    service
        .create_record(sample_draft(
            unassigned_vehicle_id(),
            "https://files.test/e2.jpg",
        ))
        .expect("record creates");

    // ECO-042 vs ECO-107: "04" only matches the first vehicle.
    let rows = service
        .list_records(&RecordQuery {
            economic_number: Some("04".to_string()),
            ..RecordQuery::default()
        })
        .expect("listing succeeds");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].vehicle_id, assigned_vehicle_id());

    // Case-insensitive and matching anywhere in the number.
    let rows = service
        .list_records(&RecordQuery {
            economic_number: Some("eco-1".to_string()),
            ..RecordQuery::default()
        })
        .expect("listing succeeds");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].vehicle_id, unassigned_vehicle_id());
}

#[test]
fn date_range_filter_bounds_inspected_at() {
    let service = build_service();
    let record = service
        .create_record(sample_draft(
            assigned_vehicle_id(),
            "https://files.test/e1.jpg",
        ))
        .expect("record creates");

    let today = record.inspected_at.date_naive();
    let rows = service
        .list_records(&RecordQuery {
            from: Some(today),
            to: Some(today),
            ..RecordQuery::default()
        })
        .expect("listing succeeds");
    assert_eq!(rows.len(), 1);

    let rows = service
        .list_records(&RecordQuery {
            to: Some(today.pred_opt().unwrap()),
            ..RecordQuery::default()
        })
        .expect("listing succeeds");
    assert!(rows.is_empty());
}

#[test]
fn deletion_patches_the_cached_listing_without_a_refetch() {
    let (service, store) = service_with_counting_store();
    let kept = service
        .create_record(sample_draft(
            assigned_vehicle_id(),
            "https://files.test/e1.jpg",
        ))
        .expect("record creates");
    let doomed = service
        .create_record(sample_draft(
            assigned_vehicle_id(),
            "https://files.test/e2.jpg",
        ))
        .expect("record creates");

    // Warm the cache, then delete.
    let rows = service
        .list_records(&RecordQuery::default())
        .expect("listing succeeds");
    assert_eq!(rows.len(), 2);
    assert_eq!(store.list_calls(), 1);

    service.delete_record(&doomed.id).expect("deletion succeeds");

    let rows = service
        .list_records(&RecordQuery::default())
        .expect("listing succeeds");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, kept.id);
    assert_eq!(
        store.list_calls(),
        1,
        "the reducer patched the cache; no refetch was issued"
    );
}

#[test]
fn invalidation_forces_an_authoritative_refetch() {
    let (service, store) = service_with_counting_store();
    service
        .create_record(sample_draft(
            assigned_vehicle_id(),
            "https://files.test/e1.jpg",
        ))
        .expect("record creates");

    service
        .list_records(&RecordQuery::default())
        .expect("listing succeeds");
    service.refresh_records();
    service
        .list_records(&RecordQuery::default())
        .expect("listing succeeds");

    assert_eq!(store.list_calls(), 2, "remount reconciles against the store");
}

#[test]
fn overwrite_preserves_identity_and_replaces_content() {
    let service = build_service();
    let stored = service
        .create_record(sample_draft(
            assigned_vehicle_id(),
            "https://files.test/e1.jpg",
        ))
        .expect("record creates");

    let mut edit = sample_draft(assigned_vehicle_id(), "https://files.test/e1.jpg");
    edit.reason = "Reingreso a patio".to_string();
    edit.folio = Some("FORGED-123".to_string());

    let updated = service
        .update_record(&stored.id, edit)
        .expect("update succeeds");

    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.folio, stored.folio);
    assert_eq!(updated.inspected_at, stored.inspected_at);
    assert_eq!(updated.reason, "Reingreso a patio");
}

#[test]
fn deleting_a_missing_record_reports_not_found() {
    let service = build_service();
    let err = service
        .delete_record(&crate::inspections::domain::RecordId("rec-nope".to_string()))
        .expect_err("missing record rejected");
    assert!(matches!(
        err,
        crate::inspections::service::InspectionServiceError::Store(
            crate::inspections::repository::StoreError::NotFound
        )
    ));
}

//! In-memory store implementations. Single-writer, last-write-wins; every
//! operation is a short critical section behind a mutex.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use super::domain::{ChecklistTemplate, InspectionDraft, InspectionRecord, RecordId, TemplateId};
use super::repository::{InspectionRecordStore, StoreError, TemplateStore};

#[derive(Default)]
pub struct InMemoryTemplateStore {
    templates: Mutex<Vec<ChecklistTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn insert(&self, template: ChecklistTemplate) -> Result<ChecklistTemplate, StoreError> {
        let mut guard = self.templates.lock().expect("template mutex poisoned");
        if guard.iter().any(|existing| existing.id == template.id) {
            return Err(StoreError::Conflict);
        }
        guard.push(template.clone());
        Ok(template)
    }

    fn update(&self, template: ChecklistTemplate) -> Result<(), StoreError> {
        let mut guard = self.templates.lock().expect("template mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == template.id) {
            Some(slot) => {
                *slot = template;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn fetch(&self, id: &TemplateId) -> Result<Option<ChecklistTemplate>, StoreError> {
        let guard = self.templates.lock().expect("template mutex poisoned");
        Ok(guard.iter().find(|template| &template.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<ChecklistTemplate>, StoreError> {
        Ok(self.templates.lock().expect("template mutex poisoned").clone())
    }
}

pub struct InMemoryInspectionRecordStore {
    records: Mutex<Vec<InspectionRecord>>,
    folio_prefix: String,
    sequence: AtomicU64,
}

impl InMemoryInspectionRecordStore {
    pub fn new(folio_prefix: impl Into<String>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            folio_prefix: folio_prefix.into(),
            sequence: AtomicU64::new(1),
        }
    }

    fn next_folio(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq:05}", self.folio_prefix)
    }

    fn materialize(&self, draft: InspectionDraft) -> InspectionRecord {
        // Caller-supplied folio/inspected_at are dropped here, unconditionally.
        InspectionRecord {
            id: RecordId(Uuid::new_v4().to_string()),
            folio: self.next_folio(),
            vehicle_id: draft.vehicle_id,
            kind: draft.kind,
            driver_name: draft.driver_name,
            inspector_name: draft.inspector_name,
            reason: draft.reason,
            handover_user_id: draft.handover_user_id,
            inspector_employee_id: draft.inspector_employee_id,
            results: draft.results,
            general_observations: draft.general_observations,
            recommendations: draft.recommendations,
            priority: draft.priority,
            evidence_url: draft.evidence_url,
            next_maintenance_date: draft.next_maintenance_date,
            inspected_at: Utc::now(),
        }
    }
}

impl InspectionRecordStore for InMemoryInspectionRecordStore {
    fn create(&self, draft: InspectionDraft) -> Result<InspectionRecord, StoreError> {
        let record = self.materialize(draft);
        let mut guard = self.records.lock().expect("record mutex poisoned");
        guard.push(record.clone());
        Ok(record)
    }

    fn overwrite(
        &self,
        id: &RecordId,
        draft: InspectionDraft,
    ) -> Result<InspectionRecord, StoreError> {
        let mut guard = self.records.lock().expect("record mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(StoreError::NotFound)?;

        let updated = InspectionRecord {
            id: slot.id.clone(),
            folio: slot.folio.clone(),
            inspected_at: slot.inspected_at,
            vehicle_id: draft.vehicle_id,
            kind: draft.kind,
            driver_name: draft.driver_name,
            inspector_name: draft.inspector_name,
            reason: draft.reason,
            handover_user_id: draft.handover_user_id,
            inspector_employee_id: draft.inspector_employee_id,
            results: draft.results,
            general_observations: draft.general_observations,
            recommendations: draft.recommendations,
            priority: draft.priority,
            evidence_url: draft.evidence_url,
            next_maintenance_date: draft.next_maintenance_date,
        };
        *slot = updated.clone();
        Ok(updated)
    }

    fn fetch(&self, id: &RecordId) -> Result<Option<InspectionRecord>, StoreError> {
        let guard = self.records.lock().expect("record mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<InspectionRecord>, StoreError> {
        Ok(self.records.lock().expect("record mutex poisoned").clone())
    }

    fn remove(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("record mutex poisoned");
        let before = guard.len();
        guard.retain(|record| &record.id != id);
        if guard.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

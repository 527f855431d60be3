use super::domain::{ChecklistTemplate, InspectionDraft, InspectionRecord, RecordId, TemplateId};

/// Storage abstraction for checklist templates so the catalog can be
/// exercised in isolation. Listing preserves insertion order.
pub trait TemplateStore: Send + Sync {
    fn insert(&self, template: ChecklistTemplate) -> Result<ChecklistTemplate, StoreError>;
    fn update(&self, template: ChecklistTemplate) -> Result<(), StoreError>;
    fn fetch(&self, id: &TemplateId) -> Result<Option<ChecklistTemplate>, StoreError>;
    fn list(&self) -> Result<Vec<ChecklistTemplate>, StoreError>;
}

/// Storage abstraction for persisted inspections. `create` and `overwrite`
/// own folio and timestamp assignment; whatever the draft carries for those
/// fields is discarded. `overwrite` keeps id, folio, and `inspected_at` from
/// the stored record and replaces everything else (last write wins).
pub trait InspectionRecordStore: Send + Sync {
    fn create(&self, draft: InspectionDraft) -> Result<InspectionRecord, StoreError>;
    fn overwrite(&self, id: &RecordId, draft: InspectionDraft)
        -> Result<InspectionRecord, StoreError>;
    fn fetch(&self, id: &RecordId) -> Result<Option<InspectionRecord>, StoreError>;
    fn list(&self) -> Result<Vec<InspectionRecord>, StoreError>;
    fn remove(&self, id: &RecordId) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

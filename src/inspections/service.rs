use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::directory::{
    AuthContext, DirectoryError, RoleDirectory, UserId, VehicleDirectory, VehicleId,
};

use super::catalog::{TemplateCatalog, TemplateChange, TemplateDraft, TemplateQuery};
use super::completion::{completion, gate_new_submission, CompletionReport, IncompleteFormError};
use super::domain::{
    ChecklistKind, ChecklistTemplate, InspectionDraft, InspectionRecord, Priority, RecordId,
    TemplateId,
};
use super::records::{matches, CacheEvent, ListingCache, RecordQuery};
use super::report::{render_detail, render_printable, InspectionDetailView};
use super::repository::{InspectionRecordStore, StoreError, TemplateStore};
use super::resolver::{effective_role, TemplateSelection};
use super::session::{InspectionSession, SessionError};

/// Metadata the inspector fills in alongside the checklist answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionMetadata {
    pub kind: ChecklistKind,
    pub driver_name: String,
    pub inspector_name: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handover_user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance_date: Option<chrono::NaiveDate>,
}

/// Error raised by the inspection facade.
#[derive(Debug, thiserror::Error)]
pub enum InspectionServiceError {
    #[error(transparent)]
    Incomplete(#[from] IncompleteFormError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl InspectionServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InspectionServiceError::Incomplete(_) | InspectionServiceError::Session(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            InspectionServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            InspectionServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
            InspectionServiceError::Store(StoreError::Unavailable(_))
            | InspectionServiceError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Facade composing the template catalog, role resolution, the record store,
/// and the listing cache.
pub struct InspectionService<T, R, V, D> {
    catalog: TemplateCatalog<T>,
    records: Arc<R>,
    vehicles: Arc<V>,
    roles: Arc<D>,
    cache: ListingCache,
}

impl<T, R, V, D> InspectionService<T, R, V, D>
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    pub fn new(templates: Arc<T>, records: Arc<R>, vehicles: Arc<V>, roles: Arc<D>) -> Self {
        Self {
            catalog: TemplateCatalog::new(templates),
            records,
            vehicles,
            roles,
            cache: ListingCache::default(),
        }
    }

    // --- templates ---

    pub fn create_template(
        &self,
        draft: TemplateDraft,
    ) -> Result<ChecklistTemplate, InspectionServiceError> {
        let template = self.catalog.create(draft)?;
        info!(template = %template.id.0, "checklist template created");
        Ok(template)
    }

    pub fn template(&self, id: &TemplateId) -> Result<ChecklistTemplate, InspectionServiceError> {
        Ok(self.catalog.get(id)?)
    }

    pub fn list_templates(
        &self,
        query: &TemplateQuery,
    ) -> Result<Vec<ChecklistTemplate>, InspectionServiceError> {
        Ok(self.catalog.list(query)?)
    }

    pub fn update_template(
        &self,
        id: &TemplateId,
        change: TemplateChange,
    ) -> Result<ChecklistTemplate, InspectionServiceError> {
        Ok(self.catalog.update(id, change)?)
    }

    pub fn clone_template(
        &self,
        id: &TemplateId,
        active: bool,
    ) -> Result<ChecklistTemplate, InspectionServiceError> {
        let copy = self.catalog.clone_template(id, active)?;
        info!(original = %id.0, copy = %copy.id.0, "checklist template cloned");
        Ok(copy)
    }

    pub fn set_template_active(
        &self,
        id: &TemplateId,
        active: bool,
    ) -> Result<ChecklistTemplate, InspectionServiceError> {
        Ok(self.catalog.set_active(id, active)?)
    }

    // --- selection and sessions ---

    /// Resolves the effective role for the pairing and fetches the active
    /// templates targeting it.
    pub fn selection_for(
        &self,
        auth: &AuthContext,
        vehicle: Option<&VehicleId>,
    ) -> Result<TemplateSelection, InspectionServiceError> {
        let role = effective_role(auth, vehicle, self.vehicles.as_ref())?;
        let role_name = self.roles.fetch(&role)?.map(|role| role.name);
        let templates = self
            .catalog
            .list(&TemplateQuery::applicable_to(role.clone()))?;
        Ok(TemplateSelection {
            effective_role: role,
            role_name,
            templates,
        })
    }

    pub fn open_session(
        &self,
        auth: &AuthContext,
        vehicle: Option<VehicleId>,
    ) -> Result<InspectionSession, InspectionServiceError> {
        let selection = self.selection_for(auth, vehicle.as_ref())?;
        Ok(InspectionSession::start(selection, vehicle))
    }

    pub fn open_edit_session(
        &self,
        auth: &AuthContext,
        record_id: &RecordId,
    ) -> Result<InspectionSession, InspectionServiceError> {
        let record = self.record(record_id)?;
        let selection = self.selection_for(auth, Some(&record.vehicle_id))?;
        Ok(InspectionSession::start_edit(selection, &record))
    }

    pub fn completion_of(&self, session: &InspectionSession) -> CompletionReport {
        completion(session.templates(), session.draft())
    }

    /// Submits a new inspection from an open session. The completeness and
    /// evidence gate runs first; on failure no store call is issued.
    pub fn submit_session(
        &self,
        session: &InspectionSession,
        metadata: InspectionMetadata,
    ) -> Result<InspectionRecord, InspectionServiceError> {
        if !session.is_editing() {
            gate_new_submission(self.completion_of(session), session.evidence_url())?;
        }

        let vehicle_id = session
            .vehicle_id()
            .cloned()
            .ok_or(SessionError::VehicleRequired)?;
        let draft = InspectionDraft {
            vehicle_id,
            kind: metadata.kind,
            driver_name: metadata.driver_name,
            inspector_name: metadata.inspector_name,
            reason: metadata.reason,
            handover_user_id: metadata.handover_user_id,
            inspector_employee_id: metadata.inspector_employee_id,
            results: session.persisted_results(),
            general_observations: metadata.general_observations,
            recommendations: metadata.recommendations,
            priority: metadata.priority,
            evidence_url: session.evidence_url().unwrap_or_default().to_string(),
            next_maintenance_date: metadata.next_maintenance_date,
            folio: None,
            inspected_at: None,
        };

        match session.editing() {
            Some(id) => self.update_record(id, draft),
            None => self.create_record(draft),
        }
    }

    // --- records ---

    /// Persists a new record. Mirrors the evidence invariant at this
    /// boundary as well: a new record never lands without evidence.
    pub fn create_record(
        &self,
        draft: InspectionDraft,
    ) -> Result<InspectionRecord, InspectionServiceError> {
        if draft.evidence_url.trim().is_empty() {
            return Err(IncompleteFormError::MissingEvidence.into());
        }
        let record = self.records.create(draft)?;
        self.cache.apply(&CacheEvent::Created(record.clone()));
        info!(folio = %record.folio, "inspection recorded");
        Ok(record)
    }

    /// Fully overwrites an existing record; the completion gate does not
    /// apply here, partial edits are legitimate.
    pub fn update_record(
        &self,
        id: &RecordId,
        draft: InspectionDraft,
    ) -> Result<InspectionRecord, InspectionServiceError> {
        let record = self.records.overwrite(id, draft)?;
        self.cache.apply(&CacheEvent::Updated(record.clone()));
        Ok(record)
    }

    pub fn record(&self, id: &RecordId) -> Result<InspectionRecord, InspectionServiceError> {
        Ok(self.records.fetch(id)?.ok_or(StoreError::NotFound)?)
    }

    /// Filtered listing served from the cache when it is warm. The
    /// economic-number filter joins through the vehicle directory.
    pub fn list_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<InspectionRecord>, InspectionServiceError> {
        let rows = match self.cache.snapshot() {
            Some(rows) => rows,
            None => {
                let rows = self.records.list()?;
                self.cache.fill(rows.clone());
                rows
            }
        };

        let mut filtered = Vec::new();
        for record in rows {
            let vehicle = if query.needs_vehicle_join() {
                self.vehicles.fetch(&record.vehicle_id)?
            } else {
                None
            };
            if matches(&record, query, vehicle.as_ref()) {
                filtered.push(record);
            }
        }
        Ok(filtered)
    }

    pub fn record_detail(
        &self,
        id: &RecordId,
    ) -> Result<InspectionDetailView, InspectionServiceError> {
        Ok(render_detail(&self.record(id)?))
    }

    /// Printable document for a record, with the vehicle header resolved
    /// through the directory when the vehicle still exists.
    pub fn record_printable(&self, id: &RecordId) -> Result<String, InspectionServiceError> {
        let record = self.record(id)?;
        let vehicle = self.vehicles.fetch(&record.vehicle_id)?;
        Ok(render_printable(&record, vehicle.as_ref()))
    }

    /// Immediate, irreversible removal. The confirmed deletion patches the
    /// cached listing so subsequent lists reflect it without a reload.
    pub fn delete_record(&self, id: &RecordId) -> Result<(), InspectionServiceError> {
        self.records.remove(id)?;
        self.cache.apply(&CacheEvent::Deleted(id.clone()));
        info!(record = %id.0, "inspection deleted");
        Ok(())
    }

    /// Authoritative reconciliation: drop the cached listing so the next
    /// read refetches from the store.
    pub fn refresh_records(&self) {
        self.cache.invalidate();
    }
}

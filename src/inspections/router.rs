use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::directory::{AuthContext, RoleDirectory, RoleId, User, UserId, VehicleDirectory, VehicleId};

use super::catalog::{TemplateChange, TemplateDraft, TemplateQuery};
use super::domain::{InspectionDraft, RecordId, TemplateId};
use super::records::RecordQuery;
use super::repository::{InspectionRecordStore, TemplateStore};
use super::service::{InspectionService, InspectionServiceError};

/// Router builder exposing the checklist catalog, template selection, and
/// inspection record endpoints.
pub fn inspection_router<T, R, V, D>(service: Arc<InspectionService<T, R, V, D>>) -> Router
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/checklists/templates",
            get(list_templates_handler::<T, R, V, D>).post(create_template_handler::<T, R, V, D>),
        )
        .route(
            "/api/v1/checklists/templates/:template_id",
            get(get_template_handler::<T, R, V, D>).put(update_template_handler::<T, R, V, D>),
        )
        .route(
            "/api/v1/checklists/templates/:template_id/clone",
            post(clone_template_handler::<T, R, V, D>),
        )
        .route(
            "/api/v1/checklists/templates/:template_id/active",
            post(set_active_handler::<T, R, V, D>),
        )
        .route(
            "/api/v1/checklists/selection",
            get(selection_handler::<T, R, V, D>),
        )
        .route(
            "/api/v1/inspections",
            get(list_inspections_handler::<T, R, V, D>)
                .post(create_inspection_handler::<T, R, V, D>),
        )
        .route(
            "/api/v1/inspections/:record_id",
            get(get_inspection_handler::<T, R, V, D>)
                .put(update_inspection_handler::<T, R, V, D>)
                .delete(delete_inspection_handler::<T, R, V, D>),
        )
        .route(
            "/api/v1/inspections/:record_id/report",
            get(report_handler::<T, R, V, D>),
        )
        .route(
            "/api/v1/inspections/:record_id/printable",
            get(printable_handler::<T, R, V, D>),
        )
        .with_state(service)
}

fn error_response(error: InspectionServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (error.status_code(), Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateListParams {
    #[serde(default)]
    active_only: Option<bool>,
    #[serde(default)]
    unique: Option<bool>,
    #[serde(default)]
    role_id: Option<String>,
}

impl TemplateListParams {
    fn into_query(self) -> TemplateQuery {
        TemplateQuery {
            active_only: self.active_only.unwrap_or(false),
            unique: self.unique.unwrap_or(false),
            role_scope: self.role_id.map(RoleId),
        }
    }
}

pub(crate) async fn list_templates_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Query(params): Query<TemplateListParams>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.list_templates(&params.into_query()) {
        Ok(templates) => (StatusCode::OK, Json(templates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_template_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Json(draft): Json<TemplateDraft>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.create_template(draft) {
        Ok(template) => (StatusCode::CREATED, Json(template)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_template_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Path(template_id): Path<String>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.template(&TemplateId(template_id)) {
        Ok(template) => (StatusCode::OK, Json(template)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_template_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Path(template_id): Path<String>,
    Json(change): Json<TemplateChange>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.update_template(&TemplateId(template_id), change) {
        Ok(template) => (StatusCode::OK, Json(template)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CloneParams {
    #[serde(default)]
    active: bool,
}

pub(crate) async fn clone_template_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Path(template_id): Path<String>,
    payload: Option<Json<CloneParams>>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    let params = payload.map(|Json(params)| params).unwrap_or_default();
    match service.clone_template(&TemplateId(template_id), params.active) {
        Ok(copy) => (StatusCode::CREATED, Json(copy)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActiveParams {
    active: bool,
}

pub(crate) async fn set_active_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Path(template_id): Path<String>,
    Json(params): Json<ActiveParams>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.set_template_active(&TemplateId(template_id), params.active) {
        Ok(template) => (StatusCode::OK, Json(template)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Identity of the acting user; authentication itself lives outside this
/// service, the caller forwards the session's user.
#[derive(Debug, Deserialize)]
pub(crate) struct SelectionParams {
    role_id: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    vehicle_id: Option<String>,
}

pub(crate) async fn selection_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Query(params): Query<SelectionParams>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    let auth = AuthContext {
        current_user: User {
            id: UserId(params.user_id.unwrap_or_default()),
            full_name: params.user_name.unwrap_or_default(),
            role_id: RoleId(params.role_id),
        },
    };
    let vehicle_id = params.vehicle_id.map(VehicleId);

    match service.selection_for(&auth, vehicle_id.as_ref()) {
        Ok(selection) => {
            let payload = json!({
                "status": selection.status(),
                "selection": selection,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_inspection_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Json(draft): Json<InspectionDraft>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.create_record(draft) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_inspection_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Path(record_id): Path<String>,
    Json(draft): Json<InspectionDraft>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.update_record(&RecordId(record_id), draft) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_inspection_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Path(record_id): Path<String>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.record(&RecordId(record_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_inspections_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Query(query): Query<RecordQuery>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.list_records(&query) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_inspection_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Path(record_id): Path<String>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.delete_record(&RecordId(record_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Path(record_id): Path<String>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.record_detail(&RecordId(record_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn printable_handler<T, R, V, D>(
    State(service): State<Arc<InspectionService<T, R, V, D>>>,
    Path(record_id): Path<String>,
) -> Response
where
    T: TemplateStore + 'static,
    R: InspectionRecordStore + 'static,
    V: VehicleDirectory + 'static,
    D: RoleDirectory + 'static,
{
    match service.record_printable(&RecordId(record_id)) {
        Ok(document) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            document,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::directory::{
    AuthContext, InMemoryRoleDirectory, InMemoryVehicleDirectory, Role, RoleId, User, UserId,
    Vehicle, VehicleId,
};
use crate::inspections::catalog::{ItemDraft, SectionDraft, TemplateDraft};
use crate::inspections::domain::{
    ChecklistKind, ChecklistTemplate, InspectionDraft, InspectionRecord, ItemDef, RecordId,
    SectionDef, SectionKind, TemplateId,
};
use crate::inspections::repository::{InspectionRecordStore, StoreError};
use crate::inspections::infra::{InMemoryInspectionRecordStore, InMemoryTemplateStore};
use crate::inspections::service::InspectionService;

pub(super) const DRIVER_ROLE: &str = "role-chofer";
pub(super) const SUPERVISOR_ROLE: &str = "role-supervisor";

pub(super) fn driver_role() -> RoleId {
    RoleId(DRIVER_ROLE.to_string())
}

pub(super) fn supervisor_role() -> RoleId {
    RoleId(SUPERVISOR_ROLE.to_string())
}

/// Motor/Cabina template with deterministic uids so tests can address
/// sections and items directly.
pub(super) fn motor_template() -> ChecklistTemplate {
    ChecklistTemplate {
        id: TemplateId("tpl-motor".to_string()),
        name: "Revisión diaria".to_string(),
        description: "Checklist antes de salir a ruta".to_string(),
        kind: ChecklistKind::Express,
        sections: vec![
            SectionDef {
                uid: "sec-motor".to_string(),
                title: "Motor".to_string(),
                kind: SectionKind::Tristate,
                items: vec![
                    ItemDef {
                        uid: "it-aceite".to_string(),
                        name: "Aceite".to_string(),
                    },
                    ItemDef {
                        uid: "it-frenos".to_string(),
                        name: "Frenos".to_string(),
                    },
                ],
            },
            SectionDef {
                uid: "sec-cabina".to_string(),
                title: "Cabina".to_string(),
                kind: SectionKind::Binary,
                items: vec![ItemDef {
                    uid: "it-cinturones".to_string(),
                    name: "Cinturones".to_string(),
                }],
            },
        ],
        role_ids: vec![driver_role()],
        active: true,
    }
}

pub(super) fn motor_template_draft() -> TemplateDraft {
    TemplateDraft {
        name: "Revisión diaria".to_string(),
        description: "Checklist antes de salir a ruta".to_string(),
        kind: ChecklistKind::Express,
        sections: vec![
            SectionDraft {
                uid: None,
                title: "Motor".to_string(),
                kind: SectionKind::Tristate,
                items: vec![
                    ItemDraft {
                        uid: None,
                        name: "Aceite".to_string(),
                    },
                    ItemDraft {
                        uid: None,
                        name: "Frenos".to_string(),
                    },
                ],
            },
            SectionDraft {
                uid: None,
                title: "Cabina".to_string(),
                kind: SectionKind::Binary,
                items: vec![ItemDraft {
                    uid: None,
                    name: "Cinturones".to_string(),
                }],
            },
        ],
        role_ids: vec![driver_role()],
        active: true,
    }
}

pub(super) fn driver_user() -> User {
    User {
        id: UserId("usr-driver".to_string()),
        full_name: "Raúl Medina".to_string(),
        role_id: driver_role(),
    }
}

pub(super) fn supervisor_auth() -> AuthContext {
    AuthContext {
        current_user: User {
            id: UserId("usr-supervisor".to_string()),
            full_name: "Lucía Ferrer".to_string(),
            role_id: supervisor_role(),
        },
    }
}

pub(super) fn assigned_vehicle_id() -> VehicleId {
    VehicleId("veh-1".to_string())
}

pub(super) fn unassigned_vehicle_id() -> VehicleId {
    VehicleId("veh-2".to_string())
}

pub(super) fn fleet_directory() -> InMemoryVehicleDirectory {
    let directory = InMemoryVehicleDirectory::with_fleet(vec![
        Vehicle {
            id: assigned_vehicle_id(),
            economic_number: "ECO-042".to_string(),
            plates: "XKL-93-21".to_string(),
            brand: "Kenworth".to_string(),
            model: "T380".to_string(),
            year: Some(2021),
            assigned_user_id: Some(driver_user().id),
        },
        Vehicle {
            id: unassigned_vehicle_id(),
            economic_number: "ECO-107".to_string(),
            plates: "UTR-55-08".to_string(),
            brand: "International".to_string(),
            model: "MV607".to_string(),
            year: Some(2019),
            assigned_user_id: None,
        },
    ]);
    directory.assign(assigned_vehicle_id(), driver_user());
    directory
}

pub(super) fn roles_directory() -> InMemoryRoleDirectory {
    InMemoryRoleDirectory::with_roles(vec![
        Role {
            id: driver_role(),
            name: "Chofer".to_string(),
        },
        Role {
            id: supervisor_role(),
            name: "Supervisor de flota".to_string(),
        },
    ])
}

pub(super) type TestService = InspectionService<
    InMemoryTemplateStore,
    InMemoryInspectionRecordStore,
    InMemoryVehicleDirectory,
    InMemoryRoleDirectory,
>;

pub(super) fn build_service() -> Arc<TestService> {
    let templates = Arc::new(InMemoryTemplateStore::new());
    let records = Arc::new(InMemoryInspectionRecordStore::new("INS"));
    let vehicles = Arc::new(fleet_directory());
    let roles = Arc::new(roles_directory());
    Arc::new(InspectionService::new(templates, records, vehicles, roles))
}

/// Record store wrapper that counts full listings, so cache behavior can be
/// asserted without reaching into the service.
pub(super) struct CountingRecordStore {
    inner: InMemoryInspectionRecordStore,
    list_calls: AtomicUsize,
}

impl CountingRecordStore {
    pub(super) fn new() -> Self {
        Self {
            inner: InMemoryInspectionRecordStore::new("INS"),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }
}

impl InspectionRecordStore for CountingRecordStore {
    fn create(&self, draft: InspectionDraft) -> Result<InspectionRecord, StoreError> {
        self.inner.create(draft)
    }

    fn overwrite(
        &self,
        id: &RecordId,
        draft: InspectionDraft,
    ) -> Result<InspectionRecord, StoreError> {
        self.inner.overwrite(id, draft)
    }

    fn fetch(&self, id: &RecordId) -> Result<Option<InspectionRecord>, StoreError> {
        self.inner.fetch(id)
    }

    fn list(&self) -> Result<Vec<InspectionRecord>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        self.inner.list()
    }

    fn remove(&self, id: &RecordId) -> Result<(), StoreError> {
        self.inner.remove(id)
    }
}

pub(super) fn sample_draft(vehicle_id: VehicleId, evidence_url: &str) -> InspectionDraft {
    let mut results = crate::inspections::domain::InspectionResults::new();
    let mut motor = crate::inspections::domain::SectionAnswers::new();
    motor.insert(
        "Aceite".to_string(),
        crate::inspections::domain::ItemAnswer {
            state: Some(crate::inspections::domain::AnswerState::Good),
            observation: "Nivel correcto".to_string(),
        },
    );
    results.insert("Motor".to_string(), motor);

    InspectionDraft {
        vehicle_id,
        kind: ChecklistKind::Express,
        driver_name: "Raúl Medina".to_string(),
        inspector_name: "Lucía Ferrer".to_string(),
        reason: "Salida a ruta".to_string(),
        handover_user_id: None,
        inspector_employee_id: Some("EMP-221".to_string()),
        results,
        general_observations: Some("Unidad en buen estado".to_string()),
        recommendations: None,
        priority: Some(crate::inspections::domain::Priority::Low),
        evidence_url: evidence_url.to_string(),
        next_maintenance_date: None,
        folio: None,
        inspected_at: None,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body reads");
    serde_json::from_slice(&body).expect("body parses as json")
}

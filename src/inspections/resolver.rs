use serde::Serialize;

use crate::directory::{AuthContext, DirectoryError, RoleId, VehicleDirectory, VehicleId};

use super::domain::ChecklistTemplate;

/// Computes the role a checklist should target. When the selected vehicle
/// has an assigned user, that user's role wins, so a supervisor filling out
/// a checklist for a driver's vehicle sees the driver's templates. A lookup
/// miss or a missing vehicle falls back to the acting user's own role.
pub fn effective_role(
    auth: &AuthContext,
    vehicle: Option<&VehicleId>,
    vehicles: &dyn VehicleDirectory,
) -> Result<RoleId, DirectoryError> {
    if let Some(vehicle_id) = vehicle {
        if let Some(assigned) = vehicles.assigned_user(vehicle_id)? {
            return Ok(assigned.role_id);
        }
    }
    Ok(auth.current_user.role_id.clone())
}

/// Outcome of template selection for one user/vehicle pairing. An empty
/// selection is an explicit state the UI must surface, never a silent list.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSelection {
    pub effective_role: RoleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    pub templates: Vec<ChecklistTemplate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    Ready,
    NoTemplatesAssigned,
}

impl TemplateSelection {
    pub fn status(&self) -> SelectionStatus {
        if self.templates.is_empty() {
            SelectionStatus::NoTemplatesAssigned
        } else {
            SelectionStatus::Ready
        }
    }
}

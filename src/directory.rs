//! External collaborators consumed by the inspection subsystem.
//!
//! Authentication, the vehicle/role registries, and the evidence upload
//! transport are owned elsewhere; this module only defines the shapes the
//! checklist engine depends on, plus in-memory implementations used by the
//! demo wiring and the test suites. A secondary lookup returning `Ok(None)`
//! is an expected condition, never an error.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub String);

/// Role descriptor managed by the permission subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// Minimal user shape the checklist engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub role_id: RoleId,
}

/// Session context handed to the engine by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub current_user: User,
}

/// Fleet unit as exposed by the vehicle registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub economic_number: String,
    pub plates: String,
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<UserId>,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

pub trait VehicleDirectory: Send + Sync {
    fn list(&self) -> Result<Vec<Vehicle>, DirectoryError>;
    fn fetch(&self, id: &VehicleId) -> Result<Option<Vehicle>, DirectoryError>;
    /// Resolves the user a vehicle is assigned to. `None` is a lookup miss.
    fn assigned_user(&self, id: &VehicleId) -> Result<Option<User>, DirectoryError>;
}

pub trait RoleDirectory: Send + Sync {
    fn list(&self) -> Result<Vec<Role>, DirectoryError>;
    fn fetch(&self, id: &RoleId) -> Result<Option<Role>, DirectoryError>;
}

/// Evidence file handed to the upload transport.
#[derive(Debug, Clone)]
pub struct EvidenceFile {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

/// Resolved upload; the URL is attached to the in-progress form before submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedEvidence {
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("evidence upload failed with status {status}")]
    Transport { status: u16 },
}

pub trait EvidenceUploadService: Send + Sync {
    fn upload(&self, file: EvidenceFile) -> Result<UploadedEvidence, UploadError>;
}

/// In-memory vehicle registry backing the demo wiring and tests.
#[derive(Default)]
pub struct InMemoryVehicleDirectory {
    vehicles: Mutex<Vec<Vehicle>>,
    assignments: Mutex<BTreeMap<VehicleId, User>>,
}

impl InMemoryVehicleDirectory {
    pub fn with_fleet(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles: Mutex::new(vehicles),
            assignments: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn assign(&self, vehicle: VehicleId, user: User) {
        let mut guard = self.assignments.lock().expect("assignment mutex poisoned");
        guard.insert(vehicle, user);
    }
}

impl VehicleDirectory for InMemoryVehicleDirectory {
    fn list(&self) -> Result<Vec<Vehicle>, DirectoryError> {
        Ok(self.vehicles.lock().expect("vehicle mutex poisoned").clone())
    }

    fn fetch(&self, id: &VehicleId) -> Result<Option<Vehicle>, DirectoryError> {
        let guard = self.vehicles.lock().expect("vehicle mutex poisoned");
        Ok(guard.iter().find(|vehicle| &vehicle.id == id).cloned())
    }

    fn assigned_user(&self, id: &VehicleId) -> Result<Option<User>, DirectoryError> {
        let guard = self.assignments.lock().expect("assignment mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// In-memory role registry backing the demo wiring and tests.
#[derive(Default)]
pub struct InMemoryRoleDirectory {
    roles: Mutex<Vec<Role>>,
}

impl InMemoryRoleDirectory {
    pub fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            roles: Mutex::new(roles),
        }
    }
}

impl RoleDirectory for InMemoryRoleDirectory {
    fn list(&self) -> Result<Vec<Role>, DirectoryError> {
        Ok(self.roles.lock().expect("role mutex poisoned").clone())
    }

    fn fetch(&self, id: &RoleId) -> Result<Option<Role>, DirectoryError> {
        let guard = self.roles.lock().expect("role mutex poisoned");
        Ok(guard.iter().find(|role| &role.id == id).cloned())
    }
}

/// Uploader that resolves files to deterministic URLs under a base path.
pub struct StaticEvidenceUploader {
    base_url: String,
}

impl StaticEvidenceUploader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl EvidenceUploadService for StaticEvidenceUploader {
    fn upload(&self, file: EvidenceFile) -> Result<UploadedEvidence, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Transport { status: 400 });
        }

        let base = self.base_url.trim_end_matches('/');
        Ok(UploadedEvidence {
            url: format!("{}/{}", base, file.file_name),
        })
    }
}

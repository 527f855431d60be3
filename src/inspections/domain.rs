use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::{RoleId, UserId, VehicleId};

/// Placeholder used whenever a section was saved without a usable title.
pub const FALLBACK_SECTION_TITLE: &str = "Sección";

/// Identifier wrapper for checklist templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub String);

/// Identifier wrapper for persisted inspection records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

/// Flavor of checklist a template describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistKind {
    Express,
    Completo,
}

impl ChecklistKind {
    pub const fn label(self) -> &'static str {
        match self {
            ChecklistKind::Express => "Express",
            ChecklistKind::Completo => "Completa",
        }
    }
}

impl fmt::Display for ChecklistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wire = match self {
            ChecklistKind::Express => "express",
            ChecklistKind::Completo => "completo",
        };
        f.write_str(wire)
    }
}

/// Declared answer vocabulary of a section. The vocabulary is data on the
/// definition, never inferred from whichever caller renders the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Binary,
    Tristate,
}

impl SectionKind {
    pub const fn allowed_states(self) -> &'static [AnswerState] {
        match self {
            SectionKind::Binary => &[AnswerState::Yes, AnswerState::No],
            SectionKind::Tristate => {
                &[AnswerState::Good, AnswerState::Regular, AnswerState::Bad]
            }
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wire = match self {
            SectionKind::Binary => "binary",
            SectionKind::Tristate => "tristate",
        };
        f.write_str(wire)
    }
}

/// Recorded state of a single checklist item. Any set state counts as
/// answered; which subset is legal comes from the section's [`SectionKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerState {
    Good,
    Regular,
    Bad,
    Yes,
    No,
}

impl AnswerState {
    /// Fixed display table used by every renderer.
    pub const fn label(self) -> &'static str {
        match self {
            AnswerState::Good => "Bueno",
            AnswerState::Regular => "Regular",
            AnswerState::Bad => "Malo",
            AnswerState::Yes => "Sí",
            AnswerState::No => "No",
        }
    }

    pub fn allowed_for(self, kind: SectionKind) -> bool {
        kind.allowed_states().contains(&self)
    }
}

impl fmt::Display for AnswerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wire = match self {
            AnswerState::Good => "good",
            AnswerState::Regular => "regular",
            AnswerState::Bad => "bad",
            AnswerState::Yes => "yes",
            AnswerState::No => "no",
        };
        f.write_str(wire)
    }
}

/// Single inspection question within a section. The `uid` is the stable
/// identity; `name` is display text and may be edited after records exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub uid: String,
    pub name: String,
}

/// Named group of items within a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDef {
    pub uid: String,
    pub title: String,
    pub kind: SectionKind,
    pub items: Vec<ItemDef>,
}

impl SectionDef {
    /// Title shown to users; a blank title falls back to the placeholder.
    pub fn display_title(&self) -> &str {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            FALLBACK_SECTION_TITLE
        } else {
            trimmed
        }
    }
}

/// Reusable, role-scoped definition of inspection sections and items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTemplate {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    pub kind: ChecklistKind,
    pub sections: Vec<SectionDef>,
    pub role_ids: Vec<RoleId>,
    pub active: bool,
}

impl ChecklistTemplate {
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|section| section.items.len()).sum()
    }

    pub fn targets_role(&self, role: &RoleId) -> bool {
        self.role_ids.iter().any(|id| id == role)
    }
}

/// Answer captured for one item: the state plus a free-text observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<AnswerState>,
    #[serde(default)]
    pub observation: String,
}

impl ItemAnswer {
    pub fn is_marked(&self) -> bool {
        self.state.is_some()
    }
}

/// Answers of one persisted section, keyed by item display name.
pub type SectionAnswers = BTreeMap<String, ItemAnswer>;

/// Persisted answer structure, keyed by section display title. The keys are
/// free text copied at fill time, not references into any template, so a
/// record stays renderable after its template is edited, cloned, or deleted.
pub type InspectionResults = BTreeMap<String, SectionAnswers>;

/// Follow-up urgency recorded by the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::High => "Alta",
            Priority::Medium => "Media",
            Priority::Low => "Baja",
        }
    }
}

/// Persisted outcome of an inspection session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub id: RecordId,
    pub folio: String,
    pub vehicle_id: VehicleId,
    pub kind: ChecklistKind,
    pub driver_name: String,
    pub inspector_name: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handover_user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_employee_id: Option<String>,
    pub results: InspectionResults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub evidence_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance_date: Option<NaiveDate>,
    pub inspected_at: DateTime<Utc>,
}

/// Caller-supplied payload for creating or overwriting a record. `folio` and
/// `inspected_at` are accepted on the wire but always discarded; the store
/// assigns its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionDraft {
    pub vehicle_id: VehicleId,
    pub kind: ChecklistKind,
    pub driver_name: String,
    pub inspector_name: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handover_user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_employee_id: Option<String>,
    pub results: InspectionResults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub evidence_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspected_at: Option<DateTime<Utc>>,
}

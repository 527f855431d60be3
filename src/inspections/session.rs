use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::directory::VehicleId;

use super::domain::{
    AnswerState, ChecklistTemplate, InspectionRecord, InspectionResults, ItemAnswer, RecordId,
    SectionAnswers, SectionKind,
};
use super::resolver::TemplateSelection;

/// Answers of one in-progress section, keyed by item uid.
pub type DraftSection = BTreeMap<String, ItemAnswer>;

/// In-progress answer structure for one open inspection session.
///
/// Mutations are copy-on-write: each returns a new draft with a new
/// top-level map and a new object for the touched section, while every other
/// section keeps its `Arc` identity. Downstream change detection can rely on
/// `Arc::ptr_eq` instead of deep comparison.
#[derive(Debug, Clone, Default)]
pub struct AnswerDraft {
    sections: BTreeMap<String, Arc<DraftSection>>,
}

impl AnswerDraft {
    pub fn section(&self, section_uid: &str) -> Option<&Arc<DraftSection>> {
        self.sections.get(section_uid)
    }

    pub fn answer(&self, section_uid: &str, item_uid: &str) -> Option<&ItemAnswer> {
        self.sections
            .get(section_uid)
            .and_then(|section| section.get(item_uid))
    }

    pub fn with_state(&self, section_uid: &str, item_uid: &str, state: AnswerState) -> Self {
        self.rewrite(section_uid, item_uid, |answer| answer.state = Some(state))
    }

    pub fn with_observation(&self, section_uid: &str, item_uid: &str, text: &str) -> Self {
        let text = text.to_string();
        self.rewrite(section_uid, item_uid, move |answer| {
            answer.observation = text;
        })
    }

    fn rewrite(
        &self,
        section_uid: &str,
        item_uid: &str,
        apply: impl FnOnce(&mut ItemAnswer),
    ) -> Self {
        let mut sections = self.sections.clone();
        let mut section: DraftSection = sections
            .get(section_uid)
            .map(|existing| (**existing).clone())
            .unwrap_or_default();
        apply(section.entry(item_uid.to_string()).or_default());
        sections.insert(section_uid.to_string(), Arc::new(section));
        Self { sections }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("section '{section}' has no item '{item}' in the current templates")]
    UnknownItem { section: String, item: String },
    #[error("state '{state}' is not allowed for a {kind} section")]
    StateNotAllowed {
        state: AnswerState,
        kind: SectionKind,
    },
    #[error("a vehicle must be selected before the inspection can be submitted")]
    VehicleRequired,
}

/// Row rendered for one checklist item; a missing answer renders blank.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRow {
    pub uid: String,
    pub name: String,
    pub answer: ItemAnswer,
}

/// Renderable view of one template section during a session.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub uid: String,
    pub title: String,
    pub kind: SectionKind,
    pub rows: Vec<ItemRow>,
}

/// Explicit state object for one open inspection form.
///
/// Every session starts from a clean draft; closing it simply drops the
/// value, discarding all in-memory answers. The resolved template list is
/// captured at start and stays the rendering source of truth for the whole
/// session, even if a template is deactivated mid-session.
#[derive(Debug)]
pub struct InspectionSession {
    templates: Vec<ChecklistTemplate>,
    vehicle_id: Option<VehicleId>,
    editing: Option<RecordId>,
    evidence_url: Option<String>,
    draft: AnswerDraft,
}

impl InspectionSession {
    /// Opens a fresh session for a new inspection.
    pub fn start(selection: TemplateSelection, vehicle_id: Option<VehicleId>) -> Self {
        Self {
            templates: selection.templates,
            vehicle_id,
            editing: None,
            evidence_url: None,
            draft: AnswerDraft::default(),
        }
    }

    /// Opens a session over an existing record. Stored answers are matched
    /// back onto the current templates by section title and item name; keys
    /// that no longer match anything are left behind.
    pub fn start_edit(selection: TemplateSelection, record: &InspectionRecord) -> Self {
        let mut session = Self {
            templates: selection.templates,
            vehicle_id: Some(record.vehicle_id.clone()),
            editing: Some(record.id.clone()),
            evidence_url: Some(record.evidence_url.clone()),
            draft: AnswerDraft::default(),
        };
        session.seed_from(&record.results);
        session
    }

    fn seed_from(&mut self, results: &InspectionResults) {
        let mut draft = AnswerDraft::default();
        for template in &self.templates {
            for section in &template.sections {
                let Some(stored) = results.get(section.display_title()) else {
                    continue;
                };
                for item in &section.items {
                    let Some(answer) = stored.get(item.name.trim()) else {
                        continue;
                    };
                    if let Some(state) = answer.state {
                        draft = draft.with_state(&section.uid, &item.uid, state);
                    }
                    if !answer.observation.is_empty() {
                        draft = draft.with_observation(&section.uid, &item.uid, &answer.observation);
                    }
                }
            }
        }
        self.draft = draft;
    }

    pub fn templates(&self) -> &[ChecklistTemplate] {
        &self.templates
    }

    pub fn vehicle_id(&self) -> Option<&VehicleId> {
        self.vehicle_id.as_ref()
    }

    pub fn editing(&self) -> Option<&RecordId> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn draft(&self) -> &AnswerDraft {
        &self.draft
    }

    pub fn evidence_url(&self) -> Option<&str> {
        self.evidence_url.as_deref()
    }

    /// Attaches an already-uploaded evidence URL to the form.
    pub fn set_evidence_url(&mut self, url: impl Into<String>) {
        self.evidence_url = Some(url.into());
    }

    pub fn set_state(
        &mut self,
        section_uid: &str,
        item_uid: &str,
        state: AnswerState,
    ) -> Result<(), SessionError> {
        let kind = self.locate(section_uid, item_uid)?;
        if !state.allowed_for(kind) {
            return Err(SessionError::StateNotAllowed { state, kind });
        }
        self.draft = self.draft.with_state(section_uid, item_uid, state);
        Ok(())
    }

    pub fn set_observation(
        &mut self,
        section_uid: &str,
        item_uid: &str,
        text: &str,
    ) -> Result<(), SessionError> {
        self.locate(section_uid, item_uid)?;
        self.draft = self.draft.with_observation(section_uid, item_uid, text);
        Ok(())
    }

    fn locate(&self, section_uid: &str, item_uid: &str) -> Result<SectionKind, SessionError> {
        self.templates
            .iter()
            .flat_map(|template| template.sections.iter())
            .find(|section| section.uid == section_uid)
            .filter(|section| section.items.iter().any(|item| item.uid == item_uid))
            .map(|section| section.kind)
            .ok_or_else(|| SessionError::UnknownItem {
                section: section_uid.to_string(),
                item: item_uid.to_string(),
            })
    }

    /// Renderable rows, always driven by the resolved templates rather than
    /// whatever happens to exist in the draft.
    pub fn section_views(&self) -> Vec<SectionView> {
        self.templates
            .iter()
            .flat_map(|template| template.sections.iter())
            .map(|section| SectionView {
                uid: section.uid.clone(),
                title: section.display_title().to_string(),
                kind: section.kind,
                rows: section
                    .items
                    .iter()
                    .map(|item| ItemRow {
                        uid: item.uid.clone(),
                        name: item.name.trim().to_string(),
                        answer: self
                            .draft
                            .answer(&section.uid, &item.uid)
                            .cloned()
                            .unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Denormalizes the draft into the self-describing, title-keyed shape a
    /// record persists. Titles and item names are copied as plain text at
    /// fill time; blank titles fall back to the placeholder.
    pub fn persisted_results(&self) -> InspectionResults {
        let mut results = InspectionResults::new();
        for template in &self.templates {
            for section in &template.sections {
                let answers: &mut SectionAnswers =
                    results.entry(section.display_title().to_string()).or_default();
                for item in &section.items {
                    let answer = self
                        .draft
                        .answer(&section.uid, &item.uid)
                        .cloned()
                        .unwrap_or_default();
                    answers.insert(item.name.trim().to_string(), answer);
                }
            }
        }
        results
    }
}

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::RoleId;

use super::domain::{
    ChecklistKind, ChecklistTemplate, ItemDef, SectionDef, SectionKind, TemplateId,
};
use super::repository::{StoreError, TemplateStore};

/// Suffix appended to a cloned template's name.
pub const CLONE_NAME_SUFFIX: &str = " (Copia)";

/// Incoming section shape for create/update. A draft carrying a `uid` keeps
/// that stable identity (so a retitle is a rename, not a new section); drafts
/// without one get a fresh uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub title: String,
    pub kind: SectionKind,
    pub items: Vec<ItemDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub name: String,
}

/// Payload for creating a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ChecklistKind,
    pub sections: Vec<SectionDraft>,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
    #[serde(default)]
    pub active: bool,
}

/// Partial, in-place template update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChecklistKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<SectionDraft>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<RoleId>>,
}

/// Listing controls. With `unique` set, the role-scoped result set comes
/// first and the global set follows, deduplicated by id with first-seen
/// order preserved (role-scoped entries win). Without `unique`, a role scope
/// restricts the listing to templates targeting that role.
#[derive(Debug, Clone, Default)]
pub struct TemplateQuery {
    pub active_only: bool,
    pub unique: bool,
    pub role_scope: Option<RoleId>,
}

impl TemplateQuery {
    /// Active templates targeting one role, as used to fill a checklist.
    pub fn applicable_to(role: RoleId) -> Self {
        Self {
            active_only: true,
            unique: false,
            role_scope: Some(role),
        }
    }
}

/// Catalog service layering template semantics over a [`TemplateStore`].
pub struct TemplateCatalog<S> {
    store: Arc<S>,
}

impl<S: TemplateStore> TemplateCatalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create(&self, draft: TemplateDraft) -> Result<ChecklistTemplate, StoreError> {
        let template = ChecklistTemplate {
            id: TemplateId(Uuid::new_v4().to_string()),
            name: draft.name.trim().to_string(),
            description: draft.description,
            kind: draft.kind,
            sections: materialize_sections(draft.sections),
            role_ids: draft.role_ids,
            active: draft.active,
        };
        self.store.insert(template)
    }

    pub fn get(&self, id: &TemplateId) -> Result<ChecklistTemplate, StoreError> {
        self.store.fetch(id)?.ok_or(StoreError::NotFound)
    }

    pub fn list(&self, query: &TemplateQuery) -> Result<Vec<ChecklistTemplate>, StoreError> {
        let all: Vec<ChecklistTemplate> = self
            .store
            .list()?
            .into_iter()
            .filter(|template| !query.active_only || template.active)
            .collect();

        let Some(role) = &query.role_scope else {
            return Ok(all);
        };

        if !query.unique {
            return Ok(all
                .into_iter()
                .filter(|template| template.targets_role(role))
                .collect());
        }

        // Role-scoped entries first, then everything else, deduplicated by id.
        let mut merged: Vec<ChecklistTemplate> = Vec::with_capacity(all.len());
        for template in all.iter().filter(|template| template.targets_role(role)) {
            if !merged.iter().any(|seen| seen.id == template.id) {
                merged.push(template.clone());
            }
        }
        for template in all {
            if !merged.iter().any(|seen| seen.id == template.id) {
                merged.push(template);
            }
        }
        Ok(merged)
    }

    pub fn update(
        &self,
        id: &TemplateId,
        change: TemplateChange,
    ) -> Result<ChecklistTemplate, StoreError> {
        let mut template = self.get(id)?;

        if let Some(name) = change.name {
            template.name = name.trim().to_string();
        }
        if let Some(description) = change.description {
            template.description = description;
        }
        if let Some(kind) = change.kind {
            template.kind = kind;
        }
        if let Some(sections) = change.sections {
            template.sections = materialize_sections(sections);
        }
        if let Some(role_ids) = change.role_ids {
            template.role_ids = role_ids;
        }

        self.store.update(template.clone())?;
        Ok(template)
    }

    /// Duplicates a template into a fresh identity. The copy gets the
    /// ` (Copia)` name suffix, new section/item uids, and the caller-chosen
    /// activation default; the two copies never influence each other again.
    pub fn clone_template(
        &self,
        id: &TemplateId,
        active: bool,
    ) -> Result<ChecklistTemplate, StoreError> {
        let original = self.get(id)?;

        let sections = original
            .sections
            .iter()
            .map(|section| SectionDef {
                uid: fresh_uid(),
                title: section.title.clone(),
                kind: section.kind,
                items: section
                    .items
                    .iter()
                    .map(|item| ItemDef {
                        uid: fresh_uid(),
                        name: item.name.clone(),
                    })
                    .collect(),
            })
            .collect();

        let copy = ChecklistTemplate {
            id: TemplateId(Uuid::new_v4().to_string()),
            name: format!("{}{}", original.name, CLONE_NAME_SUFFIX),
            description: original.description.clone(),
            kind: original.kind,
            sections,
            role_ids: original.role_ids.clone(),
            active,
        };
        self.store.insert(copy)
    }

    /// Single atomic flip at the store boundary; any confirm-intent step is
    /// a UI concern.
    pub fn set_active(
        &self,
        id: &TemplateId,
        active: bool,
    ) -> Result<ChecklistTemplate, StoreError> {
        let mut template = self.get(id)?;
        template.active = active;
        self.store.update(template.clone())?;
        Ok(template)
    }
}

fn fresh_uid() -> String {
    Uuid::new_v4().to_string()
}

fn materialize_sections(drafts: Vec<SectionDraft>) -> Vec<SectionDef> {
    drafts
        .into_iter()
        .map(|section| SectionDef {
            uid: section.uid.unwrap_or_else(fresh_uid),
            title: section.title,
            kind: section.kind,
            items: section
                .items
                .into_iter()
                .map(|item| ItemDef {
                    uid: item.uid.unwrap_or_else(fresh_uid),
                    name: item.name.trim().to_string(),
                })
                .collect(),
        })
        .collect()
}

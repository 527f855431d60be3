//! Template-driven vehicle inspection engine.
//!
//! Templates define role-scoped sections and items; the resolver picks the
//! effective role for a user/vehicle pairing; a session collects answers
//! copy-on-write against the resolved templates; the completion gate blocks
//! incomplete new submissions; records persist a self-describing, title-keyed
//! copy of the answers; and the renderers rebuild detail and printable views
//! from a record alone.

pub mod catalog;
pub mod completion;
pub mod domain;
pub mod infra;
pub mod records;
pub mod report;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use catalog::{
    ItemDraft, SectionDraft, TemplateCatalog, TemplateChange, TemplateDraft, TemplateQuery,
    CLONE_NAME_SUFFIX,
};
pub use completion::{completion, gate_new_submission, CompletionReport, IncompleteFormError};
pub use domain::{
    AnswerState, ChecklistKind, ChecklistTemplate, InspectionDraft, InspectionRecord,
    InspectionResults, ItemAnswer, ItemDef, Priority, RecordId, SectionAnswers, SectionDef,
    SectionKind, TemplateId, FALLBACK_SECTION_TITLE,
};
pub use infra::{InMemoryInspectionRecordStore, InMemoryTemplateStore};
pub use records::{CacheEvent, ListingCache, RecordQuery};
pub use report::{render_detail, render_printable, InspectionDetailView};
pub use repository::{InspectionRecordStore, StoreError, TemplateStore};
pub use resolver::{effective_role, SelectionStatus, TemplateSelection};
pub use router::inspection_router;
pub use service::{InspectionMetadata, InspectionService, InspectionServiceError};
pub use session::{AnswerDraft, InspectionSession, SessionError};

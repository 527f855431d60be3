use serde::Serialize;

use super::domain::{ChecklistTemplate, ItemAnswer};
use super::session::AnswerDraft;

/// Tally of answered items across the applicable templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    pub total: usize,
    pub marked: usize,
}

impl CompletionReport {
    /// Vacuously true when the templates enumerate zero items.
    pub const fn all_answered(self) -> bool {
        self.total == 0 || self.marked == self.total
    }

    pub const fn missing(self) -> usize {
        self.total - self.marked
    }
}

/// Counts every item enumerated by the applicable templates and how many
/// carry a state in the draft.
pub fn completion(templates: &[ChecklistTemplate], draft: &AnswerDraft) -> CompletionReport {
    let mut total = 0;
    let mut marked = 0;
    for template in templates {
        for section in &template.sections {
            for item in &section.items {
                total += 1;
                if draft
                    .answer(&section.uid, &item.uid)
                    .map(ItemAnswer::is_marked)
                    .unwrap_or(false)
                {
                    marked += 1;
                }
            }
        }
    }
    CompletionReport { total, marked }
}

/// Raised when a new inspection is submitted before the form is complete.
/// The message is the discoverable reason the UI surfaces; no store call is
/// issued while this error stands.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IncompleteFormError {
    #[error("{missing} of {total} checklist items still need an answer")]
    UnansweredItems { total: usize, missing: usize },
    #[error("an evidence photo must be uploaded before submitting a new inspection")]
    MissingEvidence,
}

/// Submission gate for a new record: every item answered and a non-empty
/// evidence URL attached. Edits of existing records bypass this gate.
pub fn gate_new_submission(
    report: CompletionReport,
    evidence_url: Option<&str>,
) -> Result<(), IncompleteFormError> {
    if !report.all_answered() {
        return Err(IncompleteFormError::UnansweredItems {
            total: report.total,
            missing: report.missing(),
        });
    }
    match evidence_url {
        Some(url) if !url.trim().is_empty() => Ok(()),
        _ => Err(IncompleteFormError::MissingEvidence),
    }
}

//! Renders a persisted inspection back into viewable and printable form.
//!
//! Both renderers work purely from the record's stored `results`; the
//! originating template is never consulted, so records survive template
//! edits, clones, and deletions unchanged.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::directory::{Vehicle, VehicleId};

use super::domain::{AnswerState, ChecklistKind, InspectionRecord, Priority};

#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AnswerState>,
    pub state_label: String,
    pub observation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionDetail {
    pub title: String,
    pub rows: Vec<DetailRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionDetailView {
    pub folio: String,
    pub vehicle_id: VehicleId,
    pub kind: ChecklistKind,
    pub kind_label: &'static str,
    pub driver_name: String,
    pub inspector_name: String,
    pub reason: String,
    pub sections: Vec<SectionDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_observations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_label: Option<&'static str>,
    pub evidence_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_maintenance_date: Option<NaiveDate>,
    pub inspected_at: DateTime<Utc>,
}

/// Reconstructs section/item rows from the stored results, translating each
/// state through the fixed label table. An unanswered item renders with a
/// blank label.
pub fn render_detail(record: &InspectionRecord) -> InspectionDetailView {
    let sections = record
        .results
        .iter()
        .map(|(title, answers)| SectionDetail {
            title: title.clone(),
            rows: answers
                .iter()
                .map(|(item, answer)| DetailRow {
                    item: item.clone(),
                    state: answer.state,
                    state_label: answer
                        .state
                        .map(|state| state.label().to_string())
                        .unwrap_or_default(),
                    observation: answer.observation.clone(),
                })
                .collect(),
        })
        .collect();

    InspectionDetailView {
        folio: record.folio.clone(),
        vehicle_id: record.vehicle_id.clone(),
        kind: record.kind,
        kind_label: record.kind.label(),
        driver_name: record.driver_name.clone(),
        inspector_name: record.inspector_name.clone(),
        reason: record.reason.clone(),
        sections,
        general_observations: record.general_observations.clone(),
        recommendations: record.recommendations.clone(),
        priority: record.priority,
        priority_label: record.priority.map(Priority::label),
        evidence_url: record.evidence_url.clone(),
        next_maintenance_date: record.next_maintenance_date,
        inspected_at: record.inspected_at,
    }
}

/// Builds the printable document: vehicle header, one table per non-empty
/// section, and a closing summary block. Sections whose stored results are
/// empty are omitted rather than rendered as bare headings.
pub fn render_printable(record: &InspectionRecord, vehicle: Option<&Vehicle>) -> String {
    let mut doc = String::new();

    let _ = writeln!(doc, "REPORTE DE INSPECCIÓN {}", record.folio);
    let _ = writeln!(doc, "Tipo: {}", record.kind.label());
    let _ = writeln!(doc, "Fecha: {}", record.inspected_at.format("%Y-%m-%d %H:%M UTC"));
    doc.push('\n');

    match vehicle {
        Some(vehicle) => {
            let _ = writeln!(doc, "Vehículo: {} {}", vehicle.brand, vehicle.model);
            let _ = writeln!(doc, "No. económico: {}", vehicle.economic_number);
            let _ = writeln!(doc, "Placas: {}", vehicle.plates);
            if let Some(year) = vehicle.year {
                let _ = writeln!(doc, "Año: {year}");
            }
        }
        None => {
            let _ = writeln!(doc, "Vehículo: {}", record.vehicle_id.0);
        }
    }
    let _ = writeln!(doc, "Conductor: {}", record.driver_name);
    let _ = writeln!(doc, "Inspector: {}", record.inspector_name);
    let _ = writeln!(doc, "Motivo: {}", record.reason);
    if let Some(employee_id) = &record.inspector_employee_id {
        let _ = writeln!(doc, "No. empleado: {employee_id}");
    }

    for (title, answers) in &record.results {
        if answers.is_empty() {
            continue;
        }

        doc.push('\n');
        let _ = writeln!(doc, "== {title} ==");

        let item_width = answers
            .keys()
            .map(|item| item.chars().count())
            .max()
            .unwrap_or(0)
            .max("Actividad".chars().count());
        let _ = writeln!(doc, "{:<item_width$} | {:<8} | Observación", "Actividad", "Estado");
        for (item, answer) in answers {
            let state_label = answer.state.map(AnswerState::label).unwrap_or("");
            let _ = writeln!(
                doc,
                "{:<item_width$} | {:<8} | {}",
                item, state_label, answer.observation
            );
        }
    }

    doc.push('\n');
    let _ = writeln!(doc, "== Resumen ==");
    if let Some(priority) = record.priority {
        let _ = writeln!(doc, "Prioridad: {}", priority.label());
    }
    if let Some(observations) = &record.general_observations {
        let _ = writeln!(doc, "Observaciones generales: {observations}");
    }
    if let Some(recommendations) = &record.recommendations {
        let _ = writeln!(doc, "Recomendaciones: {recommendations}");
    }
    if let Some(date) = record.next_maintenance_date {
        let _ = writeln!(doc, "Próximo mantenimiento: {date}");
    }
    let _ = writeln!(doc, "Evidencia: {}", record.evidence_url);

    doc
}

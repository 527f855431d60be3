use chrono::Utc;

use super::common::*;
use crate::directory::VehicleDirectory;
use crate::inspections::domain::{
    AnswerState, ChecklistKind, InspectionRecord, InspectionResults, ItemAnswer, Priority,
    RecordId, SectionAnswers,
};
use crate::inspections::report::{render_detail, render_printable};

/// Record whose section/item titles match no existing template, as happens
/// after the source template is edited or deleted.
fn orphan_record() -> InspectionRecord {
    let mut results = InspectionResults::new();

    let mut suspension = SectionAnswers::new();
    suspension.insert(
        "Amortiguadores".to_string(),
        ItemAnswer {
            state: Some(AnswerState::Regular),
            observation: "Desgaste visible".to_string(),
        },
    );
    suspension.insert(
        "Muelles".to_string(),
        ItemAnswer {
            state: Some(AnswerState::Good),
            observation: String::new(),
        },
    );
    results.insert("Suspensión".to_string(), suspension);

    let mut luces = SectionAnswers::new();
    luces.insert(
        "Direccionales".to_string(),
        ItemAnswer {
            state: Some(AnswerState::No),
            observation: "Foco fundido".to_string(),
        },
    );
    results.insert("Luces".to_string(), luces);

    // Stored empty; the printable must omit it instead of rendering a bare
    // heading.
    results.insert("Carrocería".to_string(), SectionAnswers::new());

    InspectionRecord {
        id: RecordId("rec-orphan".to_string()),
        folio: "INS-00007".to_string(),
        vehicle_id: assigned_vehicle_id(),
        kind: ChecklistKind::Completo,
        driver_name: "Raúl Medina".to_string(),
        inspector_name: "Lucía Ferrer".to_string(),
        reason: "Entrega de unidad".to_string(),
        handover_user_id: None,
        inspector_employee_id: Some("EMP-221".to_string()),
        results,
        general_observations: Some("Programar alineación".to_string()),
        recommendations: Some("Cambiar foco direccional".to_string()),
        priority: Some(Priority::Medium),
        evidence_url: "https://files.test/evidencia.jpg".to_string(),
        next_maintenance_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 15),
        inspected_at: Utc::now(),
    }
}

#[test]
fn detail_view_is_rebuilt_purely_from_stored_results() {
    let view = render_detail(&orphan_record());

    assert_eq!(view.folio, "INS-00007");
    assert_eq!(view.kind_label, "Completa");
    // Three stored sections, including the empty one, in stored order.
    assert_eq!(view.sections.len(), 3);

    let suspension = view
        .sections
        .iter()
        .find(|section| section.title == "Suspensión")
        .expect("section renders from stored title");
    assert_eq!(suspension.rows.len(), 2);
}

#[test]
fn detail_view_translates_states_through_the_fixed_label_table() {
    let view = render_detail(&orphan_record());

    let luces = view
        .sections
        .iter()
        .find(|section| section.title == "Luces")
        .expect("section renders");
    assert_eq!(luces.rows[0].state_label, "No");

    let suspension = view
        .sections
        .iter()
        .find(|section| section.title == "Suspensión")
        .expect("section renders");
    let labels: Vec<_> = suspension
        .rows
        .iter()
        .map(|row| row.state_label.as_str())
        .collect();
    assert_eq!(labels, vec!["Regular", "Bueno"]);
}

#[test]
fn state_labels_cover_the_whole_vocabulary() {
    assert_eq!(AnswerState::Good.label(), "Bueno");
    assert_eq!(AnswerState::Regular.label(), "Regular");
    assert_eq!(AnswerState::Bad.label(), "Malo");
    assert_eq!(AnswerState::Yes.label(), "Sí");
    assert_eq!(AnswerState::No.label(), "No");
}

#[test]
fn printable_renders_vehicle_header_tables_and_summary() {
    let vehicles = fleet_directory();
    let vehicle = vehicles
        .fetch(&assigned_vehicle_id())
        .expect("directory responds")
        .expect("vehicle exists");

    let doc = render_printable(&orphan_record(), Some(&vehicle));

    assert!(doc.contains("REPORTE DE INSPECCIÓN INS-00007"));
    assert!(doc.contains("Kenworth T380"));
    assert!(doc.contains("ECO-042"));
    assert!(doc.contains("== Suspensión =="));
    assert!(doc.contains("Amortiguadores"));
    assert!(doc.contains("Regular"));
    assert!(doc.contains("Desgaste visible"));
    assert!(doc.contains("Prioridad: Media"));
    assert!(doc.contains("Observaciones generales: Programar alineación"));
    assert!(doc.contains("Próximo mantenimiento: 2026-09-15"));
}

#[test]
fn printable_omits_sections_with_no_stored_answers() {
    let doc = render_printable(&orphan_record(), None);
    assert!(!doc.contains("Carrocería"));
}

#[test]
fn printable_degrades_to_the_vehicle_id_without_a_directory_hit() {
    let doc = render_printable(&orphan_record(), None);
    assert!(doc.contains("Vehículo: veh-1"));
}

#[test]
fn renderers_survive_records_whose_template_is_gone() {
    // The orphan record references sections no template defines; both
    // renderers must still produce every stored row.
    let record = orphan_record();

    let detail = render_detail(&record);
    let rendered_rows: usize = detail.sections.iter().map(|s| s.rows.len()).sum();
    assert_eq!(rendered_rows, 3);

    let doc = render_printable(&record, None);
    assert!(doc.contains("Muelles"));
    assert!(doc.contains("Foco fundido"));
}

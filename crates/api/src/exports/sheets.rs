//! Column layouts for each export.

use serde_json::Value;

use erasmus_core::audit::properties;
use erasmus_core::call::{CallModality, CallStatus, CallType};
use erasmus_core::document::DocumentType;
use erasmus_core::labels::{event_label, format_date, format_datetime, subject_type_label, yes_no};
use erasmus_core::news::{MobilityCategory, MobilityType, NewsStatus};
use erasmus_core::resolution::ResolutionType;
use erasmus_db::models::activity::ActivityLog;
use erasmus_db::models::call::CallExportRow;
use erasmus_db::models::document::DocumentExportRow;
use erasmus_db::models::news_post::NewsPostExportRow;
use erasmus_db::models::newsletter::NewsletterSubscription;
use erasmus_db::models::resolution::ResolutionExportRow;

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

pub const CALLS_FILENAME: &str = "convocatorias";

pub const CALL_HEADERS: &[&str] = &[
    "ID",
    "Título",
    "Programa",
    "Año Académico",
    "Tipo",
    "Modalidad",
    "Número de Plazas",
    "Destinos",
    "Estado",
    "Fecha Inicio Estimada",
    "Fecha Fin Estimada",
    "Fecha Publicación",
    "Fecha Cierre",
    "Creado por",
    "Fecha Creación",
];

/// Destinations are stored as a JSON array of strings.
fn destinations(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

pub fn call_row(row: &CallExportRow) -> Vec<String> {
    vec![
        row.id.to_string(),
        row.title.clone(),
        text(row.program_name.as_deref()),
        text(row.academic_year.as_deref()),
        CallType::label_or_raw(&row.call_type).to_string(),
        CallModality::label_or_raw(&row.modality).to_string(),
        row.number_of_places.to_string(),
        destinations(&row.destinations),
        CallStatus::label_or_raw(&row.status).to_string(),
        format_date(row.estimated_start_date),
        format_date(row.estimated_end_date),
        format_datetime(row.published_at),
        format_datetime(row.closed_at),
        text(row.creator_name.as_deref()),
        format_datetime(Some(row.created_at)),
    ]
}

// ---------------------------------------------------------------------------
// Resolutions
// ---------------------------------------------------------------------------

pub const RESOLUTIONS_FILENAME: &str = "resoluciones";

pub const RESOLUTION_HEADERS: &[&str] = &[
    "ID",
    "Título",
    "Convocatoria",
    "Fase",
    "Tipo",
    "Fecha Oficial",
    "Publicada",
    "Fecha Publicación",
    "Creado por",
    "Fecha Creación",
];

pub fn resolution_row(row: &ResolutionExportRow) -> Vec<String> {
    vec![
        row.id.to_string(),
        row.title.clone(),
        text(row.call_title.as_deref()),
        text(row.phase_name.as_deref()),
        ResolutionType::label_or_raw(&row.resolution_type).to_string(),
        format_date(row.official_date),
        yes_no(row.published_at.is_some()).to_string(),
        format_datetime(row.published_at),
        text(row.creator_name.as_deref()),
        format_datetime(Some(row.created_at)),
    ]
}

// ---------------------------------------------------------------------------
// News posts
// ---------------------------------------------------------------------------

pub const NEWS_POSTS_FILENAME: &str = "noticias";

pub const NEWS_POST_HEADERS: &[&str] = &[
    "ID",
    "Título",
    "Programa",
    "Año Académico",
    "Tipo de Movilidad",
    "Categoría",
    "País",
    "Ciudad",
    "Estado",
    "Autor",
    "Fecha Publicación",
    "Fecha Creación",
];

pub fn news_post_row(row: &NewsPostExportRow) -> Vec<String> {
    vec![
        row.id.to_string(),
        row.title.clone(),
        text(row.program_name.as_deref()),
        text(row.academic_year.as_deref()),
        row.mobility_type
            .as_deref()
            .map(MobilityType::label_or_raw)
            .unwrap_or_default()
            .to_string(),
        row.mobility_category
            .as_deref()
            .map(MobilityCategory::label_or_raw)
            .unwrap_or_default()
            .to_string(),
        text(row.country.as_deref()),
        text(row.city.as_deref()),
        NewsStatus::label_or_raw(&row.status).to_string(),
        text(row.author_name.as_deref()),
        format_datetime(row.published_at),
        format_datetime(Some(row.created_at)),
    ]
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

pub const DOCUMENTS_FILENAME: &str = "documentos";

pub const DOCUMENT_HEADERS: &[&str] = &[
    "ID",
    "Título",
    "Categoría",
    "Programa",
    "Año Académico",
    "Tipo",
    "Versión",
    "Activo",
    "Descargas",
    "Fecha Creación",
];

pub fn document_row(row: &DocumentExportRow) -> Vec<String> {
    vec![
        row.id.to_string(),
        row.title.clone(),
        text(row.category_name.as_deref()),
        text(row.program_name.as_deref()),
        text(row.academic_year.as_deref()),
        DocumentType::label_or_raw(&row.document_type).to_string(),
        text(row.version.as_deref()),
        yes_no(row.is_active).to_string(),
        row.download_count.to_string(),
        format_datetime(Some(row.created_at)),
    ]
}

// ---------------------------------------------------------------------------
// Newsletter
// ---------------------------------------------------------------------------

pub const NEWSLETTER_FILENAME: &str = "suscripciones-newsletter";

pub const NEWSLETTER_HEADERS: &[&str] = &[
    "Email",
    "Nombre",
    "Programas",
    "Estado",
    "Verificado",
    "Fecha Suscripción",
    "Fecha Baja",
];

pub fn newsletter_row(row: &NewsletterSubscription) -> Vec<String> {
    let programs = if row.programs.is_empty() {
        "Todos".to_string()
    } else {
        row.programs.join(", ")
    };
    let status = if row.is_active { "Activo" } else { "Baja" };

    vec![
        row.email.clone(),
        text(row.name.as_deref()),
        programs,
        status.to_string(),
        yes_no(row.is_verified()).to_string(),
        format_datetime(Some(row.subscribed_at)),
        format_datetime(row.unsubscribed_at),
    ]
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

pub const ACTIVITY_FILENAME: &str = "registro-actividad";

pub const ACTIVITY_HEADERS: &[&str] = &[
    "ID",
    "Fecha",
    "Usuario",
    "Descripción",
    "Evento",
    "Modelo",
    "ID Registro",
    "IP",
    "Cambios",
];

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "(vacío)".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One `campo: antes → después` segment per changed field. Creations and
/// deletions only carry one side.
pub fn summarize_changes(props: &Value) -> String {
    let attributes = props.get(properties::ATTRIBUTES).and_then(Value::as_object);
    let old = props.get(properties::OLD).and_then(Value::as_object);

    let mut parts = Vec::new();
    match (attributes, old) {
        (Some(new), Some(old)) => {
            for (field, value) in new {
                let before = old.get(field).unwrap_or(&Value::Null);
                parts.push(format!(
                    "{field}: {} → {}",
                    display_value(before),
                    display_value(value)
                ));
            }
        }
        (Some(side), None) | (None, Some(side)) => {
            for (field, value) in side {
                parts.push(format!("{field}: {}", display_value(value)));
            }
        }
        (None, None) => {
            if let (Some(from), Some(to)) = (
                props.get(properties::OLD_STATUS).and_then(Value::as_str),
                props.get(properties::NEW_STATUS).and_then(Value::as_str),
            ) {
                parts.push(format!("status: {from} → {to}"));
            }
        }
    }
    parts.join("; ")
}

pub fn activity_row(row: &ActivityLog) -> Vec<String> {
    vec![
        row.id.to_string(),
        format_datetime(Some(row.created_at)),
        row.causer_name.clone().unwrap_or_else(|| "Sistema".to_string()),
        row.description.clone(),
        row.event
            .as_deref()
            .map(event_label)
            .unwrap_or_default()
            .to_string(),
        row.subject_type
            .as_deref()
            .map(subject_type_label)
            .unwrap_or_default()
            .to_string(),
        row.subject_id.map(|id| id.to_string()).unwrap_or_default(),
        text(row.property_str(properties::IP_ADDRESS)),
        summarize_changes(&row.properties),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    fn call_export() -> CallExportRow {
        CallExportRow {
            id: 7,
            title: "Movilidad FCT 2025".into(),
            program_name: Some("Erasmus+ FP".into()),
            academic_year: Some("2025-2026".into()),
            call_type: "alumnado".into(),
            modality: "corta".into(),
            number_of_places: 12,
            destinations: json!(["Italia", "Portugal"]),
            status: "abierta".into(),
            estimated_start_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            estimated_end_date: None,
            published_at: Some(Utc.with_ymd_and_hms(2025, 10, 1, 8, 30, 0).unwrap()),
            closed_at: None,
            creator_name: None,
            created_at: Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn call_row_matches_headers() {
        let row = call_row(&call_export());
        assert_eq!(row.len(), CALL_HEADERS.len());
        assert_eq!(row[7], "Italia, Portugal");
        assert_eq!(row[8], CallStatus::Abierta.label());
        assert_eq!(row[9], "01/03/2026");
        assert_eq!(row[10], "");
        assert_eq!(row[11], "01/10/2025 08:30");
    }

    #[test]
    fn newsletter_without_programs_reads_all() {
        let sub = NewsletterSubscription {
            id: 1,
            email: "ana@example.org".into(),
            name: None,
            programs: vec![],
            is_active: false,
            subscribed_at: Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap(),
            unsubscribed_at: Some(Utc.with_ymd_and_hms(2025, 2, 2, 10, 0, 0).unwrap()),
            verification_token: None,
            verified_at: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 2, 2, 10, 0, 0).unwrap(),
        };
        let row = newsletter_row(&sub);
        assert_eq!(row.len(), NEWSLETTER_HEADERS.len());
        assert_eq!(row[2], "Todos");
        assert_eq!(row[3], "Baja");
        assert_eq!(row[4], "No");
        assert_eq!(row[6], "02/02/2025 10:00");
    }

    #[test]
    fn update_changes_show_both_sides() {
        let props = json!({
            "attributes": {"title": "Nuevo"},
            "old": {"title": "Viejo"},
            "ip_address": "10.0.0.1"
        });
        assert_eq!(summarize_changes(&props), "title: Viejo → Nuevo");
    }

    #[test]
    fn status_changes_are_summarized() {
        let props = json!({"old_status": "borrador", "new_status": "abierta"});
        assert_eq!(summarize_changes(&props), "status: borrador → abierta");
        assert_eq!(summarize_changes(&json!({})), "");
    }

    #[test]
    fn system_entries_have_no_user() {
        let entry = ActivityLog {
            id: 3,
            log_name: "default".into(),
            description: "created".into(),
            subject_type: Some("call".into()),
            subject_id: Some(7),
            event: Some("created".into()),
            causer_id: None,
            causer_name: None,
            properties: json!({"attributes": {"title": "X"}, "ip_address": "127.0.0.1"}),
            created_at: Utc.with_ymd_and_hms(2025, 5, 5, 5, 5, 0).unwrap(),
        };
        let row = activity_row(&entry);
        assert_eq!(row.len(), ACTIVITY_HEADERS.len());
        assert_eq!(row[2], "Sistema");
        assert_eq!(row[4], "Creado");
        assert_eq!(row[5], "Convocatoria");
        assert_eq!(row[7], "127.0.0.1");
        assert_eq!(row[8], "title: X");
    }
}

//! Spanish display formatting shared by exports and API responses.

use chrono::{DateTime, NaiveDate, Utc};

use crate::audit::{events, subject_types};

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn format_datetime(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format(DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Sí"
    } else {
        "No"
    }
}

/// Label for a stored subject type. Unknown types are returned as-is.
pub fn subject_type_label(subject_type: &str) -> &str {
    match subject_type {
        subject_types::PROGRAM => "Programa",
        subject_types::ACADEMIC_YEAR => "Año Académico",
        subject_types::CALL => "Convocatoria",
        subject_types::CALL_PHASE => "Fase de Convocatoria",
        subject_types::CALL_APPLICATION => "Solicitud",
        subject_types::RESOLUTION => "Resolución",
        subject_types::NEWS_POST => "Noticia",
        subject_types::DOCUMENT_CATEGORY => "Categoría de Documento",
        subject_types::DOCUMENT => "Documento",
        subject_types::ERASMUS_EVENT => "Evento",
        subject_types::NEWSLETTER_SUBSCRIPTION => "Suscripción",
        subject_types::SETTING => "Configuración",
        subject_types::TRANSLATION => "Traducción",
        subject_types::USER => "Usuario",
        other => other,
    }
}

pub fn event_label(event: &str) -> &str {
    match event {
        events::CREATED => "Creado",
        events::UPDATED => "Actualizado",
        events::DELETED => "Eliminado",
        events::RESTORED => "Restaurado",
        events::FORCE_DELETED => "Eliminado permanentemente",
        events::PUBLISH => "Publicado",
        events::UNPUBLISH => "Despublicado",
        events::STATUS_CHANGED => "Cambio de estado",
        events::LOGIN => "Inicio de sesión",
        events::LOGOUT => "Cierre de sesión",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_use_day_first() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_date(Some(d)), "07/03/2025");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn datetimes_include_minutes() {
        let t = Utc.with_ymd_and_hms(2025, 11, 2, 9, 5, 30).unwrap();
        assert_eq!(format_datetime(Some(t)), "02/11/2025 09:05");
    }

    #[test]
    fn yes_no_is_spanish() {
        assert_eq!(yes_no(true), "Sí");
        assert_eq!(yes_no(false), "No");
    }

    #[test]
    fn unknown_subject_type_passes_through() {
        assert_eq!(subject_type_label("call"), "Convocatoria");
        assert_eq!(subject_type_label("widget"), "widget");
        assert_eq!(event_label("publish"), "Publicado");
    }
}

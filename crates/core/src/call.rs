//! Call (convocatoria) enumerations and lifecycle rules.
//!
//! Status moves informally borrador → abierta → cerrada → en_baremacion →
//! resuelta → archivada, but no transition is rejected. Moving into
//! `abierta`, or from `abierta` back to `borrador`, changes whether the call
//! is public and takes the publish permission; every other move takes the
//! update permission. Timestamps follow the status: entering `abierta`
//! stamps `published_at`, entering `cerrada` stamps `closed_at`.

use crate::error::CoreError;
use crate::types::Timestamp;

define_text_enum! {
    /// Lifecycle status of a call.
    CallStatus ("call status") {
        Borrador = ("borrador", "Borrador"),
        Abierta = ("abierta", "Abierta"),
        Cerrada = ("cerrada", "Cerrada"),
        EnBaremacion = ("en_baremacion", "En baremación"),
        Resuelta = ("resuelta", "Resuelta"),
        Archivada = ("archivada", "Archivada"),
    }
}

define_text_enum! {
    /// Who the call is addressed to.
    CallType ("call type") {
        Alumnado = ("alumnado", "Alumnado"),
        Personal = ("personal", "Personal"),
    }
}

define_text_enum! {
    /// Mobility duration.
    CallModality ("call modality") {
        Corta = ("corta", "Corta duración"),
        Larga = ("larga", "Larga duración"),
    }
}

define_text_enum! {
    /// Phases a call goes through, in their usual order.
    PhaseType ("phase type") {
        Publicacion = ("publicacion", "Publicación"),
        Solicitudes = ("solicitudes", "Presentación de solicitudes"),
        Provisional = ("provisional", "Listado provisional"),
        Alegaciones = ("alegaciones", "Alegaciones"),
        Definitivo = ("definitivo", "Listado definitivo"),
        Renuncias = ("renuncias", "Renuncias"),
        ListaEspera = ("lista_espera", "Lista de espera"),
    }
}

define_text_enum! {
    /// Status of an individual application to a call.
    ApplicationStatus ("application status") {
        Pendiente = ("pendiente", "Pendiente"),
        Admitida = ("admitida", "Admitida"),
        Excluida = ("excluida", "Excluida"),
        Seleccionada = ("seleccionada", "Seleccionada"),
        Reserva = ("reserva", "Reserva"),
        Renuncia = ("renuncia", "Renuncia"),
    }
}

/// Status plus the timestamps that depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallLifecycle {
    pub status: CallStatus,
    pub published_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
}

impl CallLifecycle {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// Whether moving to `status` opens the call or withdraws it to draft.
    pub fn changes_visibility(&self, status: CallStatus) -> bool {
        match (self.status, status) {
            (CallStatus::Abierta, CallStatus::Abierta) => false,
            (_, CallStatus::Abierta) => true,
            (CallStatus::Abierta, CallStatus::Borrador) => true,
            _ => false,
        }
    }

    /// Set an arbitrary status. Existing timestamps are never overwritten.
    pub fn with_status(self, status: CallStatus, now: Timestamp) -> Self {
        let published_at = match status {
            CallStatus::Abierta => self.published_at.or(Some(now)),
            _ => self.published_at,
        };
        let closed_at = match status {
            CallStatus::Cerrada => self.closed_at.or(Some(now)),
            _ => self.closed_at,
        };
        Self {
            status,
            published_at,
            closed_at,
        }
    }

    /// Publishing opens the call and stamps `published_at` with `now`.
    pub fn published(self, now: Timestamp) -> Self {
        Self {
            status: CallStatus::Abierta,
            published_at: Some(now),
            closed_at: self.closed_at,
        }
    }

    /// Unpublishing returns the call to draft.
    pub fn unpublished(self) -> Self {
        Self {
            status: CallStatus::Borrador,
            published_at: None,
            closed_at: self.closed_at,
        }
    }
}

/// Normalise the destinations list: trim entries, drop blanks and duplicates
/// while keeping the first occurrence order.
pub fn normalize_destinations(destinations: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(destinations.len());
    for d in destinations {
        let trimmed = d.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.iter().any(|existing| existing.eq_ignore_ascii_case(trimmed)) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// A scoring table is a JSON object mapping criteria to either a maximum
/// score or a nested object describing the criterion.
pub fn validate_scoring_table(table: &serde_json::Value) -> Result<(), CoreError> {
    let map = table.as_object().ok_or_else(|| {
        CoreError::Validation("scoring_table must be a JSON object".to_string())
    })?;
    for (criterion, value) in map {
        match value {
            serde_json::Value::Number(n) if n.as_f64().is_some_and(|v| v >= 0.0) => {}
            serde_json::Value::Object(_) => {}
            _ => {
                return Err(CoreError::Validation(format!(
                    "scoring_table entry '{criterion}' must be a non-negative number or an object"
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn draft() -> CallLifecycle {
        CallLifecycle {
            status: CallStatus::Borrador,
            published_at: None,
            closed_at: None,
        }
    }

    #[test]
    fn opening_and_withdrawing_change_visibility() {
        let open = draft().with_status(CallStatus::Abierta, Utc::now());
        assert!(draft().changes_visibility(CallStatus::Abierta));
        assert!(open.changes_visibility(CallStatus::Borrador));
        assert!(!open.changes_visibility(CallStatus::Abierta));
        assert!(!open.changes_visibility(CallStatus::Cerrada));
        assert!(!draft().changes_visibility(CallStatus::Cerrada));

        let closed = open.with_status(CallStatus::Cerrada, Utc::now());
        assert!(closed.changes_visibility(CallStatus::Abierta));
        assert!(!closed.changes_visibility(CallStatus::Borrador));
    }

    #[test]
    fn status_values_round_trip() {
        for status in CallStatus::ALL {
            assert_eq!(CallStatus::parse(status.as_str()).unwrap(), *status);
        }
    }

    #[test]
    fn invalid_status_lists_valid_values() {
        let err = CallStatus::parse("open").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("borrador"));
        assert!(msg.contains("archivada"));
    }

    #[test]
    fn labels_are_spanish() {
        assert_eq!(CallStatus::EnBaremacion.label(), "En baremación");
        assert_eq!(CallStatus::label_or_raw("resuelta"), "Resuelta");
        assert_eq!(CallStatus::label_or_raw("legacy"), "legacy");
    }

    #[test]
    fn publish_opens_and_stamps() {
        let now = Utc::now();
        let published = draft().published(now);
        assert_eq!(published.status, CallStatus::Abierta);
        assert_eq!(published.published_at, Some(now));
    }

    #[test]
    fn unpublish_returns_to_draft() {
        let now = Utc::now();
        let back = draft().published(now).unpublished();
        assert_eq!(back.status, CallStatus::Borrador);
        assert!(!back.is_published());
    }

    #[test]
    fn opening_keeps_existing_publication_date() {
        let earlier = Utc::now() - Duration::days(3);
        let now = Utc::now();
        let call = CallLifecycle {
            status: CallStatus::Cerrada,
            published_at: Some(earlier),
            closed_at: None,
        };
        let reopened = call.with_status(CallStatus::Abierta, now);
        assert_eq!(reopened.published_at, Some(earlier));
    }

    #[test]
    fn closing_stamps_closed_at_once() {
        let first = Utc::now() - Duration::hours(1);
        let closed = draft().with_status(CallStatus::Cerrada, first);
        assert_eq!(closed.closed_at, Some(first));

        let again = closed.with_status(CallStatus::Cerrada, Utc::now());
        assert_eq!(again.closed_at, Some(first));
    }

    #[test]
    fn any_transition_is_allowed() {
        let now = Utc::now();
        let archived = draft().with_status(CallStatus::Archivada, now);
        assert_eq!(archived.status, CallStatus::Archivada);
        let back = archived.with_status(CallStatus::Borrador, now);
        assert_eq!(back.status, CallStatus::Borrador);
    }

    #[test]
    fn destinations_are_trimmed_and_deduplicated() {
        let input = vec![
            " Italia ".to_string(),
            "".to_string(),
            "italia".to_string(),
            "Portugal".to_string(),
        ];
        assert_eq!(normalize_destinations(&input), vec!["Italia", "Portugal"]);
    }

    #[test]
    fn scoring_table_validation() {
        assert!(validate_scoring_table(&json!({"expediente": 5, "idioma": {"max": 3}})).is_ok());
        assert!(validate_scoring_table(&json!([1, 2])).is_err());
        assert!(validate_scoring_table(&json!({"idioma": -1})).is_err());
        assert!(validate_scoring_table(&json!({"idioma": "tres"})).is_err());
    }
}

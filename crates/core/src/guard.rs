//! Deletion guards: a record with live dependents cannot be deleted.

use crate::error::CoreError;

/// A kind of dependent record, with the grammatical gender needed to build
/// the Spanish message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependentKind {
    pub plural: &'static str,
    pub feminine: bool,
}

pub mod kinds {
    use super::DependentKind;

    pub const CALLS: DependentKind = DependentKind { plural: "convocatorias", feminine: true };
    pub const NEWS_POSTS: DependentKind = DependentKind { plural: "noticias", feminine: true };
    pub const DOCUMENTS: DependentKind = DependentKind { plural: "documentos", feminine: false };
    pub const EVENTS: DependentKind = DependentKind { plural: "eventos", feminine: false };
    pub const PHASES: DependentKind = DependentKind { plural: "fases", feminine: true };
    pub const RESOLUTIONS: DependentKind = DependentKind { plural: "resoluciones", feminine: true };
    pub const APPLICATIONS: DependentKind = DependentKind { plural: "solicitudes", feminine: true };
}

/// Collects non-zero dependent counts for one record.
///
/// ```
/// use erasmus_core::guard::{kinds, Dependents};
///
/// let err = Dependents::new("el programa")
///     .count(kinds::CALLS, 2)
///     .count(kinds::NEWS_POSTS, 1)
///     .count(kinds::DOCUMENTS, 0)
///     .ensure_none()
///     .unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Conflict: No se puede eliminar el programa porque tiene convocatorias y noticias asociadas."
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Dependents {
    subject: &'static str,
    found: Vec<DependentKind>,
}

impl Dependents {
    /// `subject` includes its article, e.g. `"la convocatoria"`.
    pub fn new(subject: &'static str) -> Self {
        Self {
            subject,
            found: Vec::new(),
        }
    }

    pub fn count(mut self, kind: DependentKind, count: i64) -> Self {
        if count > 0 {
            self.found.push(kind);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub fn message(&self) -> String {
        let names: Vec<&str> = self.found.iter().map(|k| k.plural).collect();
        let list = match names.split_last() {
            None => String::new(),
            Some((last, [])) => (*last).to_string(),
            Some((last, rest)) => format!("{} y {last}", rest.join(", ")),
        };
        let agreement = if self.found.iter().all(|k| k.feminine) {
            "asociadas"
        } else {
            "asociados"
        };
        format!(
            "No se puede eliminar {} porque tiene {list} {agreement}.",
            self.subject
        )
    }

    pub fn ensure_none(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Conflict(self.message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn no_dependents_passes() {
        assert!(Dependents::new("el programa")
            .count(kinds::CALLS, 0)
            .ensure_none()
            .is_ok());
    }

    #[test]
    fn single_dependent_message() {
        let d = Dependents::new("la categoría").count(kinds::DOCUMENTS, 4);
        assert_eq!(
            d.message(),
            "No se puede eliminar la categoría porque tiene documentos asociados."
        );
    }

    #[test]
    fn mixed_gender_uses_masculine() {
        let d = Dependents::new("el programa")
            .count(kinds::CALLS, 1)
            .count(kinds::DOCUMENTS, 1)
            .count(kinds::EVENTS, 3);
        assert_eq!(
            d.message(),
            "No se puede eliminar el programa porque tiene convocatorias, documentos y eventos asociados."
        );
    }

    #[test]
    fn conflict_error_kind() {
        let result = Dependents::new("la convocatoria")
            .count(kinds::PHASES, 2)
            .ensure_none();
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }
}

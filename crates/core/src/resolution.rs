//! Resolution enumerations and consistency checks.

use crate::error::CoreError;
use crate::types::DbId;

define_text_enum! {
    /// Kind of official resolution.
    ResolutionType ("resolution type") {
        Provisional = ("provisional", "Provisional"),
        Definitivo = ("definitivo", "Definitivo"),
        Alegaciones = ("alegaciones", "Alegaciones"),
    }
}

/// A resolution's phase, when given, must belong to the resolution's call.
///
/// `phase_call_id` is the `call_id` of the referenced phase.
pub fn ensure_phase_matches_call(call_id: DbId, phase_call_id: DbId) -> Result<(), CoreError> {
    if call_id != phase_call_id {
        return Err(CoreError::Validation(
            "call_phase_id must reference a phase of the selected call".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_of_other_call_is_rejected() {
        assert!(ensure_phase_matches_call(1, 1).is_ok());
        assert!(ensure_phase_matches_call(1, 2).is_err());
    }

    #[test]
    fn resolution_types_parse() {
        assert_eq!(
            ResolutionType::parse("definitivo").unwrap(),
            ResolutionType::Definitivo
        );
        assert!(ResolutionType::parse("final").is_err());
    }
}

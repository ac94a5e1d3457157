//! Document enumerations and version validation.

use crate::error::CoreError;

define_text_enum! {
    DocumentType ("document type") {
        Convocatoria = ("convocatoria", "Convocatoria"),
        Modelo = ("modelo", "Modelo"),
        Seguro = ("seguro", "Seguro"),
        Consentimiento = ("consentimiento", "Consentimiento"),
        Guia = ("guia", "Guía"),
        Faq = ("faq", "Preguntas frecuentes"),
        Otro = ("otro", "Otro"),
    }
}

/// Versions are dotted numeric strings such as `1`, `1.0` or `2.1.3`.
pub fn validate_version(version: &str) -> Result<(), CoreError> {
    let valid = !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "version must be dotted numbers like 1.0 (got '{version}')"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions() {
        assert!(validate_version("1").is_ok());
        assert!(validate_version("2.1.3").is_ok());
        assert!(validate_version("").is_err());
        assert!(validate_version("1..2").is_err());
        assert!(validate_version("v1").is_err());
    }
}

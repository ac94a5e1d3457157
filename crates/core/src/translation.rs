//! Locales and translatable models.

use crate::error::CoreError;

/// Locales content can be translated into. Spanish is the source language.
pub const LOCALES: &[&str] = &["es", "en", "ca", "fr"];

pub const DEFAULT_LOCALE: &str = "es";

/// Model types whose fields may carry translations, with the fields that
/// may be translated for each.
const TRANSLATABLE: &[(&str, &[&str])] = &[
    ("program", &["name", "description"]),
    ("call", &["title", "requirements", "documentation", "selection_criteria"]),
    ("news_post", &["title", "excerpt", "content"]),
    ("document", &["title", "description"]),
    ("document_category", &["name", "description"]),
    ("erasmus_event", &["title", "description"]),
    ("setting", &["value"]),
];

pub fn validate_locale(locale: &str) -> Result<(), CoreError> {
    if LOCALES.contains(&locale) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported locale '{locale}'. Supported: {}",
            LOCALES.join(", ")
        )))
    }
}

/// Check that `field` of `translatable_type` may be translated.
pub fn validate_translatable(translatable_type: &str, field: &str) -> Result<(), CoreError> {
    let fields = TRANSLATABLE
        .iter()
        .find(|(t, _)| *t == translatable_type)
        .map(|(_, f)| *f)
        .ok_or_else(|| {
            CoreError::Validation(format!("'{translatable_type}' is not translatable"))
        })?;
    if fields.contains(&field) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Field '{field}' of '{translatable_type}' is not translatable"
        )))
    }
}

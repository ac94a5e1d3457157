//! Shared field validation helpers.
//!
//! Each helper returns [`CoreError::Validation`] with a message naming the
//! offending field so handlers can surface it directly.

use crate::error::CoreError;

/// Reject empty or whitespace-only strings.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Reject strings longer than `max` characters.
pub fn require_max_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    let len = value.chars().count();
    if len > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters (got {len})"
        )));
    }
    Ok(())
}

/// Combined non-empty + max-length check used for titles and names.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    require_non_empty(field, value)?;
    require_max_len(field, value, max)
}

/// Ensure `end` is not before `start` when both are present.
pub fn validate_range<T: PartialOrd + Copy>(
    start_field: &str,
    start: Option<T>,
    end_field: &str,
    end: Option<T>,
) -> Result<(), CoreError> {
    if let (Some(s), Some(e)) = (start, end) {
        if e < s {
            return Err(CoreError::Validation(format!(
                "{end_field} must be on or after {start_field}"
            )));
        }
    }
    Ok(())
}

/// Reject negative counts such as number of places or sort order.
pub fn require_non_negative(field: &str, value: i32) -> Result<(), CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_text_is_rejected() {
        assert!(require_non_empty("title", "  ").is_err());
        assert!(require_non_empty("title", "Convocatoria").is_ok());
    }

    #[test]
    fn max_len_counts_characters_not_bytes() {
        // "ñ" is two bytes but one character.
        assert!(require_max_len("name", "ññññ", 4).is_ok());
        assert!(require_max_len("name", "ñññññ", 4).is_err());
    }

    #[test]
    fn range_end_before_start_fails() {
        let start = NaiveDate::from_ymd_opt(2025, 9, 1);
        let end = NaiveDate::from_ymd_opt(2025, 8, 31);
        let err = validate_range("start_date", start, "end_date", end).unwrap_err();
        assert!(err.to_string().contains("end_date"));
    }

    #[test]
    fn range_with_missing_bound_passes() {
        let start = NaiveDate::from_ymd_opt(2025, 9, 1);
        assert!(validate_range("start_date", start, "end_date", None).is_ok());
        assert!(validate_range::<NaiveDate>("start_date", None, "end_date", None).is_ok());
    }

    #[test]
    fn same_day_range_passes() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 1);
        assert!(validate_range("start_date", day, "end_date", day).is_ok());
    }

    #[test]
    fn negative_values_fail() {
        assert!(require_non_negative("number_of_places", -1).is_err());
        assert!(require_non_negative("number_of_places", 0).is_ok());
    }
}

//! Academic year code validation.
//!
//! Academic years are identified by codes such as `2024-2025`: two
//! four-digit years where the second follows the first.

use crate::error::CoreError;

/// Validate an academic year code and return its `(start, end)` years.
pub fn parse_year_code(code: &str) -> Result<(i32, i32), CoreError> {
    let invalid = || {
        CoreError::Validation(format!(
            "year must have the form YYYY-YYYY with consecutive years (got '{code}')"
        ))
    };

    let (start, end) = code.trim().split_once('-').ok_or_else(invalid)?;
    if start.len() != 4 || end.len() != 4 {
        return Err(invalid());
    }
    let start: i32 = start.parse().map_err(|_| invalid())?;
    let end: i32 = end.parse().map_err(|_| invalid())?;
    if end != start + 1 {
        return Err(invalid());
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_code() {
        assert_eq!(parse_year_code("2024-2025").unwrap(), (2024, 2025));
    }

    #[test]
    fn non_consecutive_years_fail() {
        assert!(parse_year_code("2024-2026").is_err());
        assert!(parse_year_code("2025-2024").is_err());
    }

    #[test]
    fn malformed_codes_fail() {
        assert!(parse_year_code("2024/2025").is_err());
        assert!(parse_year_code("24-25").is_err());
        assert!(parse_year_code("abcd-efgh").is_err());
    }
}

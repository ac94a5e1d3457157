//! Newsletter subscription rules: email normalisation, program filters and
//! verification tokens.

use uuid::Uuid;

use crate::error::CoreError;
use crate::hashing::sha256_hex;

/// Lowercase and trim an email so uniqueness is case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalise the list of program codes a subscriber is interested in and
/// check each one against the codes that exist.
///
/// An empty list means "all programs".
pub fn normalize_program_codes(
    requested: &[String],
    known: &[String],
) -> Result<Vec<String>, CoreError> {
    let mut codes: Vec<String> = Vec::new();
    for raw in requested {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            continue;
        }
        if !known.iter().any(|k| k.eq_ignore_ascii_case(&code)) {
            return Err(CoreError::Validation(format!(
                "Unknown program code: '{code}'"
            )));
        }
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes.sort();
    Ok(codes)
}

/// Generate a verification token. Returns `(plaintext, sha256_hex)`; only
/// the digest is stored.
pub fn generate_token() -> (String, String) {
    let plaintext = Uuid::new_v4().simple().to_string();
    let digest = hash_token(&plaintext);
    (plaintext, digest)
}

pub fn hash_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        vec!["KA121-VET".to_string(), "KA131-HED".to_string()]
    }

    #[test]
    fn emails_are_normalised() {
        assert_eq!(normalize_email("  Ana@Example.ORG "), "ana@example.org");
    }

    #[test]
    fn program_codes_are_uppercased_sorted_and_deduplicated() {
        let requested = vec![
            "ka131-hed".to_string(),
            "KA121-VET".to_string(),
            " ka131-hed ".to_string(),
        ];
        let codes = normalize_program_codes(&requested, &known()).unwrap();
        assert_eq!(codes, vec!["KA121-VET", "KA131-HED"]);
    }

    #[test]
    fn unknown_program_code_is_rejected() {
        let requested = vec!["KA999".to_string()];
        assert!(normalize_program_codes(&requested, &known()).is_err());
    }

    #[test]
    fn token_digest_matches() {
        let (plain, digest) = generate_token();
        assert_eq!(hash_token(&plain), digest);
        assert_eq!(plain.len(), 32);
    }
}

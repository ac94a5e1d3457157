//! URL slug generation.
//!
//! Slugs are lowercase ASCII with single hyphens between words. Spanish and
//! other Latin diacritics are folded to their base letter.

/// Maximum slug length; longer inputs are cut at a hyphen boundary.
pub const MAX_SLUG_LEN: usize = 180;

/// Convert arbitrary text into a slug.
///
/// ```
/// use erasmus_core::slug::slugify;
///
/// assert_eq!(slugify("Convocatoria Erasmus+ 2025/2026"), "convocatoria-erasmus-2025-2026");
/// assert_eq!(slugify("Año académico: Formación"), "ano-academico-formacion");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        let folded = fold(c);
        if folded.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(folded);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        let cut = slug[..MAX_SLUG_LEN].rfind('-').unwrap_or(MAX_SLUG_LEN);
        slug.truncate(cut);
    }
    slug
}

/// First slug of the form `base`, `base-2`, `base-3`, ... not in `taken`.
pub fn next_available(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn fold(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators() {
        assert_eq!(slugify("  Hola --  Mundo  "), "hola-mundo");
    }

    #[test]
    fn folds_diacritics() {
        assert_eq!(slugify("Niño Pingüino Ça"), "nino-pinguino-ca");
    }

    #[test]
    fn empty_for_symbols_only() {
        assert_eq!(slugify("¡¿?!"), "");
    }

    #[test]
    fn long_input_is_cut_on_word_boundary() {
        let text = "palabra ".repeat(40);
        let slug = slugify(&text);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.ends_with("palabra"));
    }

    #[test]
    fn next_available_appends_counter() {
        let taken = vec!["becas".to_string(), "becas-2".to_string()];
        assert_eq!(next_available("becas", &taken), "becas-3");
        assert_eq!(next_available("movilidad", &taken), "movilidad");
    }
}

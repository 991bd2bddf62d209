//! Normalizes arbitrary text into a URL-safe identifier. See [`slugify`].

/// Returned by [`slugify`] when nothing usable survives normalization.
pub const FALLBACK_SLUG: &str = "articulo";

/// Converts `text` into a slug made of lowercase ASCII letters, digits and
/// single hyphens, with no hyphen at either end. Accented letters lose their
/// marks (`é` becomes `e`), punctuation is dropped, and runs of whitespace,
/// underscores and hyphens become one hyphen. The function is total and
/// idempotent; if nothing is left it returns [`FALLBACK_SLUG`].
///
/// ```
/// use bitacora::slug::slugify;
/// assert_eq!(slugify("Evaluación Técnica #1"), "evaluacion-tecnica-1");
/// ```
pub fn slugify(text: &str) -> String {
    let folded = fold(text).to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_hyphen = false;
    for c in folded
        .trim()
        .chars()
        .filter(|&c| is_word(c) || is_separator(c))
    {
        if is_separator(c) {
            pending_hyphen = true;
            continue;
        }
        if pending_hyphen && !slug.is_empty() {
            slug.push('-');
        }
        pending_hyphen = false;
        slug.push(c);
    }

    match slug.is_empty() {
        true => FALLBACK_SLUG.to_owned(),
        false => slug,
    }
}

// Strips combining marks by transliterating non-ASCII letters and digits.
// Other non-ASCII characters are punctuation or symbols and are dropped,
// except whitespace which still separates words.
fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if c.is_alphanumeric() {
            if let Some(ascii) = deunicode::deunicode_char(c) {
                out.push_str(ascii);
            }
        } else if c.is_whitespace() {
            out.push(' ');
        }
    }
    out
}

fn is_word(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '_' || c == '-'
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_strips_accents_and_punctuation() {
        assert_eq!(slugify("Evaluación Técnica #1"), "evaluacion-tecnica-1");
        assert_eq!(slugify("Cámaras en el porche"), "camaras-en-el-porche");
        assert_eq!(slugify("¿Qué hacer?"), "que-hacer");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  foo__bar -- baz  "), "foo-bar-baz");
        assert_eq!(slugify("-leading and trailing-"), "leading-and-trailing");
        assert_eq!(slugify("01-mi-primer-post"), "01-mi-primer-post");
    }

    #[test]
    fn test_slugify_drops_apostrophes_instead_of_splitting() {
        assert_eq!(slugify("d'Andorra"), "dandorra");
    }

    #[test]
    fn test_slugify_fallback() {
        assert_eq!(slugify(""), FALLBACK_SLUG);
        assert_eq!(slugify("   "), FALLBACK_SLUG);
        assert_eq!(slugify("#!?¡¿ — ✓"), FALLBACK_SLUG);
    }

    proptest! {
        #[test]
        fn prop_slug_shape(s in "\\PC*") {
            let slug = slugify(&s);
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().all(|c| is_word(c) || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn prop_slugify_is_idempotent(s in "\\PC*") {
            let once = slugify(&s);
            prop_assert_eq!(slugify(&once), once);
        }
    }
}

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonical form used for all rule matching: lower-case, NFD-decomposed,
/// with combining marks stripped. Total and idempotent; "ÚZKOSŤ" and
/// "uzkost" normalize to the same string.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn strips_diacritics_and_case() {
        assert_eq!(normalize("ÚZKOSŤ"), "uzkost");
        assert_eq!(normalize("Chcem zomrieť"), "chcem zomriet");
        assert_eq!(normalize("předávkování"), "predavkovani");
    }

    #[test]
    fn ascii_passes_through() {
        assert_eq!(normalize("I can't take this anymore"), "i can't take this anymore");
    }

    #[test]
    fn idempotent() {
        for sample in ["Chcem zomrieť", "ÚZKOSŤ", "hello world", "", "žlťoučký kůň 123"] {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn empty_is_empty() {
        assert_eq!(normalize(""), "");
    }
}

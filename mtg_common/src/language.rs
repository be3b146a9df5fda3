//! Card languages known to Scryfall.
//!
//! The table is fixed at compile time and only used for labelling; printing
//! data may carry codes outside of it and the selection logic never rejects
//! those.

/// `(code, display name)` pairs in the order they are offered to the user.
pub const LANGUAGES: [(&str, &str); 17] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ru", "Russian"),
    ("zhs", "Chinese Simplified"),
    ("zht", "Chinese Traditional"),
    ("he", "Hebrew"),
    ("la", "Latin"),
    ("grc", "Ancient Greek"),
    ("ar", "Arabic"),
    ("sa", "Sanskrit"),
    ("px", "Phyrexian"),
];

/// Looks up the display name for a language code
pub fn display_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// True if the code is one of the 17 known languages
pub fn is_known_language(code: &str) -> bool {
    display_name(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_and_size() {
        assert_eq!(LANGUAGES.len(), 17);
        assert_eq!(LANGUAGES[0], ("en", "English"));
        assert_eq!(LANGUAGES[16], ("px", "Phyrexian"));
    }

    #[test]
    fn display_name_lookup() {
        assert_eq!(display_name("grc"), Some("Ancient Greek"));
        assert_eq!(display_name("px"), Some("Phyrexian"));
        assert_eq!(display_name("tlh"), None);
        assert!(is_known_language("en"));
        assert!(!is_known_language("EN"));
    }
}

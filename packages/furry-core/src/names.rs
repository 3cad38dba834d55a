//! Pet name cleanup.
//!
//! Shelters frequently stuff listing titles with marketing phrases, emoji,
//! IDs and shouting. [`format_pet_name`] reduces a listing title to the
//! animal's actual name in proper case.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::protocol_constants::NAME_ERROR_PLACEHOLDER;

struct NamePatterns {
    courtesy_post: Regex,
    adopt_me: Regex,
    non_letters: Regex,
    whitespace: Regex,
}

// Literal patterns, exercised by the tests below.
static PATTERNS: Lazy<NamePatterns> = Lazy::new(|| NamePatterns {
    courtesy_post: Regex::new(r"(?i)\bcourtesy\s+post\b").expect("valid regex"),
    adopt_me: Regex::new(r"(?i)\badopt\s+me\b").expect("valid regex"),
    non_letters: Regex::new(r"[^\p{L}\s]").expect("valid regex"),
    whitespace: Regex::new(r"\s+").expect("valid regex"),
});

/// Strips listing noise from a pet name and title-cases the result.
///
/// Returns [`NAME_ERROR_PLACEHOLDER`] when nothing usable remains.
#[must_use]
pub fn format_pet_name(input: Option<&str>) -> String {
    let Some(raw) = input else {
        return NAME_ERROR_PLACEHOLDER.to_string();
    };

    let p = &*PATTERNS;
    let cleaned = p.courtesy_post.replace_all(raw, "");
    let cleaned = p.adopt_me.replace_all(&cleaned, "");
    let cleaned = p.non_letters.replace_all(&cleaned, "");
    let cleaned = p.whitespace.replace_all(&cleaned, " ");

    let name = proper_case(cleaned.trim());
    if name.is_empty() {
        NAME_ERROR_PLACEHOLDER.to_string()
    } else {
        name
    }
}

/// Lowercases the input and capitalizes the first letter of every word.
#[must_use]
pub fn proper_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_phrases_symbols_and_digits() {
        assert_eq!(
            format_pet_name(Some("ADOPT ME!! fluffy   mcFluff 3")),
            "Fluffy Mcfluff"
        );
        assert_eq!(
            format_pet_name(Some("Courtesy   Post - BELLA (bonded w/ Max)")),
            "Bella Bonded W Max"
        );
    }

    #[test]
    fn phrase_removal_respects_word_boundaries() {
        // "adoptme" is not the phrase "adopt me"
        assert_eq!(format_pet_name(Some("Adoptme")), "Adoptme");
        assert_eq!(
            format_pet_name(Some("Postcourtesy post")),
            "Postcourtesy Post"
        );
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(format_pet_name(Some("ZOË #12")), "Zoë");
    }

    #[test]
    fn empty_results_use_placeholder() {
        assert_eq!(format_pet_name(None), NAME_ERROR_PLACEHOLDER);
        assert_eq!(format_pet_name(Some("")), NAME_ERROR_PLACEHOLDER);
        assert_eq!(format_pet_name(Some("#1234 adopt me")), NAME_ERROR_PLACEHOLDER);
    }

    #[test]
    fn proper_case_handles_mixed_input() {
        assert_eq!(proper_case("dOMESTIC  short HAIR"), "Domestic Short Hair");
        assert_eq!(proper_case(""), "");
    }
}

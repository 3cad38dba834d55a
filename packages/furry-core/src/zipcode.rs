//! ZIP code input handling.
//!
//! Two flavours of validation live here:
//! - [`normalize_zip_input`] is lenient and meant for keystroke-by-keystroke
//!   input: it strips everything but digits and reports whether the entry is
//!   complete yet.
//! - [`validate_zip`] is strict and meant for values arriving from config,
//!   the command line, or a geocoder.

use thiserror::Error;

use crate::protocol_constants::UNRECOGNIZED_POSTAL_CODE_PHRASE;

/// Number of digits in a US ZIP code.
pub const ZIP_LEN: usize = 5;

/// Errors produced by strict ZIP validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZipError {
    /// Input was empty after trimming.
    #[error("ZIP code is empty")]
    Empty,

    /// Input contained something other than digits (and a ZIP+4 dash).
    #[error("ZIP code contains invalid characters: {0}")]
    InvalidCharacters(String),

    /// Input had the wrong number of digits.
    #[error("ZIP code must have 5 digits (got {0})")]
    WrongLength(usize),
}

/// Normalized state of a partially typed ZIP code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZipInput {
    digits: String,
}

impl ZipInput {
    /// The digits kept so far, or `None` if nothing usable was typed.
    #[must_use]
    pub fn zip(&self) -> Option<&str> {
        if self.digits.is_empty() {
            None
        } else {
            Some(&self.digits)
        }
    }

    /// True when some digits were typed but fewer than five.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        !self.digits.is_empty() && self.digits.len() != ZIP_LEN
    }

    /// True when exactly five digits are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.digits.len() == ZIP_LEN
    }
}

/// Filters raw text input down to at most five digits.
///
/// Non-digit characters are dropped rather than rejected, so pasting
/// `"ZIP: 92692"` yields `92692`. Digits past the fifth are ignored.
#[must_use]
pub fn normalize_zip_input(raw: &str) -> ZipInput {
    ZipInput {
        digits: raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(ZIP_LEN)
            .collect(),
    }
}

/// Strictly validates a ZIP code, accepting `12345` or `12345-6789`.
///
/// ZIP+4 input is normalized to its 5-digit prefix.
pub fn validate_zip(raw: &str) -> Result<String, ZipError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ZipError::Empty);
    }

    let base = match trimmed.split_once('-') {
        Some((base, plus4)) => {
            if plus4.len() != 4 || !plus4.chars().all(|c| c.is_ascii_digit()) {
                return Err(ZipError::InvalidCharacters(trimmed.to_string()));
            }
            base
        }
        None => trimmed,
    };

    if !base.chars().all(|c| c.is_ascii_digit()) {
        return Err(ZipError::InvalidCharacters(trimmed.to_string()));
    }
    if base.len() != ZIP_LEN {
        return Err(ZipError::WrongLength(base.len()));
    }

    Ok(base.to_string())
}

/// Trims a manually entered ZIP, treating blank input as "no ZIP".
#[must_use]
pub fn manual_zip(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Returns true if an API error message says the ZIP is unknown.
#[must_use]
pub fn is_unrecognized_postal_code(message: &str) -> bool {
    message
        .to_lowercase()
        .contains(UNRECOGNIZED_POSTAL_CODE_PHRASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_non_digits_and_truncates() {
        let input = normalize_zip_input("9a2-69x2z");
        assert_eq!(input.zip(), Some("92692"));
        assert!(input.is_complete());
        assert!(!input.is_incomplete());

        let input = normalize_zip_input("926921234");
        assert_eq!(input.zip(), Some("92692"));
    }

    #[test]
    fn normalize_flags_partial_input() {
        let input = normalize_zip_input("12");
        assert_eq!(input.zip(), Some("12"));
        assert!(input.is_incomplete());
    }

    #[test]
    fn normalize_empty_is_no_zip_not_error() {
        for raw in ["", "abc", "  -  "] {
            let input = normalize_zip_input(raw);
            assert_eq!(input.zip(), None);
            assert!(!input.is_incomplete());
        }
    }

    #[test]
    fn normalize_keeps_leading_zero() {
        assert_eq!(normalize_zip_input("02134").zip(), Some("02134"));
    }

    #[test]
    fn validate_accepts_plain_and_plus4() {
        assert_eq!(validate_zip("90028").unwrap(), "90028");
        assert_eq!(validate_zip("  90028 ").unwrap(), "90028");
        assert_eq!(validate_zip("90028-1234").unwrap(), "90028");
    }

    #[test]
    fn validate_rejects_bad_input() {
        assert_eq!(validate_zip(""), Err(ZipError::Empty));
        assert_eq!(validate_zip("9002"), Err(ZipError::WrongLength(4)));
        assert!(matches!(
            validate_zip("9002a"),
            Err(ZipError::InvalidCharacters(_))
        ));
        assert!(matches!(
            validate_zip("90028-12"),
            Err(ZipError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn manual_zip_blank_is_none() {
        assert_eq!(manual_zip("   "), None);
        assert_eq!(manual_zip(" 92692 "), Some("92692".to_string()));
    }

    #[test]
    fn detects_unrecognized_postal_code_message() {
        assert!(is_unrecognized_postal_code(
            "The value 00000 is Not A Recognized PostalCode."
        ));
        assert!(!is_unrecognized_postal_code("Unauthorized"));
    }
}

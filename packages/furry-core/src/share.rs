//! Share and contact helpers for listings.

use crate::protocol_constants::DEFAULT_SHARE_SUBJECT;

/// Fields that make up a shared listing.
#[derive(Debug, Clone, Default)]
pub struct ShareListing<'a> {
    /// First line of the message; `None` omits it.
    pub subject: Option<&'a str>,
    pub pet_name: Option<&'a str>,
    pub pet_breed: Option<&'a str>,
    pub picture_url: Option<&'a str>,
    /// Organization adoption link. Nothing is shared without one.
    pub link_url: Option<&'a str>,
}

impl<'a> ShareListing<'a> {
    /// Creates a listing with the default subject line.
    #[must_use]
    pub fn new(link_url: Option<&'a str>) -> Self {
        Self {
            subject: Some(DEFAULT_SHARE_SUBJECT),
            link_url,
            ..Default::default()
        }
    }
}

/// Builds the plain-text share message for a listing.
///
/// Returns `None` when the listing has no adoption link.
#[must_use]
pub fn share_message(listing: &ShareListing<'_>) -> Option<String> {
    let link = listing.link_url?;

    let mut message = String::new();
    for line in [listing.subject, listing.pet_name, listing.pet_breed]
        .into_iter()
        .flatten()
    {
        message.push_str(line);
        message.push('\n');
    }
    if let Some(picture) = listing.picture_url {
        message.push_str(picture);
        message.push_str("\n\n");
    }
    message.push_str("Adoption link: ");
    message.push_str(link);

    Some(message)
}

/// Prefixes `https://` onto bare host names so they can be opened.
#[must_use]
pub fn normalize_web_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Builds a `tel:` URI keeping only digits and `+`.
#[must_use]
pub fn dial_uri(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{digits}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_includes_present_fields_in_order() {
        let listing = ShareListing {
            pet_name: Some("Biscuit"),
            pet_breed: Some("Beagle"),
            picture_url: Some("https://img.example/1.jpg"),
            ..ShareListing::new(Some("https://shelter.example/adopt"))
        };

        assert_eq!(
            share_message(&listing).unwrap(),
            "Give this fur baby a home:\nBiscuit\nBeagle\nhttps://img.example/1.jpg\n\n\
             Adoption link: https://shelter.example/adopt"
        );
    }

    #[test]
    fn message_skips_missing_fields() {
        let listing = ShareListing {
            subject: None,
            pet_name: Some("Biscuit"),
            ..ShareListing::new(Some("shelter.example"))
        };
        assert_eq!(
            share_message(&listing).unwrap(),
            "Biscuit\nAdoption link: shelter.example"
        );
    }

    #[test]
    fn no_link_means_nothing_to_share() {
        assert!(share_message(&ShareListing::new(None)).is_none());
    }

    #[test]
    fn web_url_gets_scheme_when_missing() {
        assert_eq!(normalize_web_url("www.spca.org"), "https://www.spca.org");
        assert_eq!(normalize_web_url("http://spca.org"), "http://spca.org");
        assert_eq!(normalize_web_url("https://spca.org"), "https://spca.org");
    }

    #[test]
    fn dial_uri_keeps_digits_and_plus() {
        assert_eq!(dial_uri("+1 (949) 555-0100"), "tel:+19495550100");
    }
}

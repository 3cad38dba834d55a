//! Shared utility functions.

use reqwest::Url;

/// Joins a relative `path` onto `base`.
///
/// A missing trailing slash on `base` is added first, so
/// `join_url("https://host/v5/public", "animals")` keeps the `public`
/// segment instead of replacing it.
pub fn join_url(base: &str, path: &str) -> Result<Url, String> {
    let base = if base.ends_with('/') {
        Url::parse(base)
    } else {
        Url::parse(&format!("{base}/"))
    };
    base.and_then(|base| base.join(path))
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_keeps_last_base_segment() {
        let url = join_url("https://api.example/v5/public", "animals/search").unwrap();
        assert_eq!(url.as_str(), "https://api.example/v5/public/animals/search");

        let url = join_url("https://api.example/v5/public/", "animals/search").unwrap();
        assert_eq!(url.as_str(), "https://api.example/v5/public/animals/search");
    }

    #[test]
    fn join_rejects_garbage() {
        assert!(join_url("not a url", "x").is_err());
    }
}

//! Reverse geocoding through a Nominatim-compatible HTTP service.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::traits::Geocoder;
use super::types::{Coordinate, LocationError, LocationResult};
use crate::utils::join_url;
use crate::zipcode::validate_zip;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ReverseAddress>,
    /// Set instead of `address` when nothing is mapped at the point.
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    #[serde(default)]
    postcode: Option<String>,
}

/// Geocoder that calls `/reverse?format=jsonv2`.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    reverse_url: Url,
    user_agent: String,
}

impl NominatimGeocoder {
    /// Creates a geocoder for the service at `base_url`.
    ///
    /// # Errors
    /// Returns `GeocodeFailed` if `base_url` is not a valid URL.
    pub fn new(
        client: Client,
        base_url: &str,
        user_agent: impl Into<String>,
    ) -> LocationResult<Self> {
        let reverse_url = join_url(base_url, "reverse").map_err(|e| {
            LocationError::GeocodeFailed(format!("invalid base URL {base_url}: {e}"))
        })?;

        Ok(Self {
            client,
            reverse_url,
            user_agent: user_agent.into(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn postal_code(&self, coordinate: Coordinate) -> LocationResult<Option<String>> {
        log::debug!("[Geocoder] Reverse lookup at {}", coordinate);

        let response = self
            .client
            .get(self.reverse_url.clone())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| LocationError::GeocodeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::GeocodeFailed(format!("HTTP {status}")));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| LocationError::GeocodeFailed(e.to_string()))?;

        if let Some(error) = body.error {
            log::debug!("[Geocoder] No address at {}: {}", coordinate, error);
            return Ok(None);
        }

        let postcode = body
            .address
            .and_then(|address| address.postcode)
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());

        // US ZIP+4 comes back as "12345-6789"; keep the 5-digit form.
        Ok(postcode.map(|code| validate_zip(&code).unwrap_or(code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::test_fixtures::serve;

    async fn reverse(
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, StatusCode> {
        if headers.get("user-agent").and_then(|v| v.to_str().ok()) != Some("furry-test/1.0") {
            return Err(StatusCode::FORBIDDEN);
        }
        assert_eq!(params.get("format").map(String::as_str), Some("jsonv2"));

        let lat: f64 = params["lat"].parse().map_err(|_| StatusCode::BAD_REQUEST)?;
        let body = if lat == 34.0 {
            json!({ "address": { "postcode": "90028", "city": "Los Angeles" } })
        } else if lat == 40.0 {
            json!({ "address": { "postcode": "10001-2345" } })
        } else if lat == 0.0 {
            json!({ "error": "Unable to geocode" })
        } else {
            json!({ "address": { "state": "Nevada" } })
        };
        Ok(Json(body))
    }

    async fn geocoder() -> NominatimGeocoder {
        let base = serve(Router::new().route("/reverse", get(reverse))).await;
        NominatimGeocoder::new(Client::new(), &base, "furry-test/1.0").unwrap()
    }

    #[tokio::test]
    async fn reads_postcode_from_address() {
        let geocoder = geocoder().await;
        let code = geocoder
            .postal_code(Coordinate::new(34.0, -118.0))
            .await
            .unwrap();
        assert_eq!(code.as_deref(), Some("90028"));
    }

    #[tokio::test]
    async fn zip_plus_four_is_shortened() {
        let geocoder = geocoder().await;
        let code = geocoder
            .postal_code(Coordinate::new(40.0, -74.0))
            .await
            .unwrap();
        assert_eq!(code.as_deref(), Some("10001"));
    }

    #[tokio::test]
    async fn unmapped_point_and_missing_postcode_are_none() {
        let geocoder = geocoder().await;
        assert_eq!(
            geocoder.postal_code(Coordinate::new(0.0, 0.0)).await.unwrap(),
            None
        );
        assert_eq!(
            geocoder
                .postal_code(Coordinate::new(38.0, -117.0))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn http_error_is_geocode_failure() {
        let base = serve(Router::new().route("/reverse", get(reverse))).await;
        let geocoder = NominatimGeocoder::new(Client::new(), &base, "someone-else").unwrap();

        let err = geocoder
            .postal_code(Coordinate::new(34.0, -118.0))
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::GeocodeFailed(msg) if msg.contains("403")));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(NominatimGeocoder::new(Client::new(), "not a url", "ua").is_err());
    }
}

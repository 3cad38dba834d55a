//! HTTP client for the RescueGroups v5 public API.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::retry::Transient;
use super::types::{FindResponse, SearchRequest, SearchResponse, Species};
use crate::protocol_constants::{
    API_CONTENT_TYPE, DEFAULT_FIND_RADIUS_MILES, DEFAULT_PAGE_LIMIT, FIND_PATH, SEARCH_INCLUDE,
    SEARCH_SORT,
};
use crate::utils::join_url;

/// Fallback detail when an error response carries nothing usable.
const UNKNOWN_API_ERROR: &str = "Unknown API error";

/// Errors from RescueGroups API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, transport).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The response body did not match the expected model.
    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Convenient Result alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Text suitable for showing to a user.
    ///
    /// Status errors show the API's own detail verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl Transient for ApiError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request() || e.is_body(),
            _ => false,
        }
    }
}

/// Query parameters of the simple animal search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindParams {
    pub limit: u32,
    pub page: u32,
    /// Singular species name, e.g. "Cat".
    pub animal_type: String,
    pub zip: String,
    pub radius_miles: u32,
}

impl FindParams {
    /// First page of cats within the default radius of `zip`.
    pub fn near(zip: impl Into<String>) -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            page: 1,
            animal_type: "Cat".to_string(),
            zip: zip.into(),
            radius_miles: DEFAULT_FIND_RADIUS_MILES,
        }
    }
}

/// Trait for the pet listing API.
#[async_trait]
pub trait PetsApi: Send + Sync {
    /// Simple search of available pets with no filtering.
    async fn get_available_pets(&self, params: &FindParams) -> ApiResult<FindResponse>;

    /// Advanced search by species, with pictures and orgs included.
    async fn search_pets(
        &self,
        species: Species,
        request: &SearchRequest,
    ) -> ApiResult<SearchResponse>;
}

/// [`PetsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct RescueGroupsClient {
    client: Client,
    base_url: String,
    api_key: String,
    page_limit: u32,
}

impl RescueGroupsClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if `base_url` cannot be parsed.
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> ApiResult<Self> {
        join_url(base_url, FIND_PATH).map_err(ApiError::InvalidRequest)?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.into(),
            page_limit: DEFAULT_PAGE_LIMIT,
        })
    }

    /// Overrides the page size used by advanced searches.
    #[must_use]
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        join_url(&self.base_url, path).map_err(ApiError::InvalidRequest)
    }
}

#[async_trait]
impl PetsApi for RescueGroupsClient {
    async fn get_available_pets(&self, params: &FindParams) -> ApiResult<FindResponse> {
        log::debug!(
            "[Api] GET {} (zip={}, radius={}mi)",
            FIND_PATH,
            params.zip,
            params.radius_miles
        );

        let response = self
            .client
            .get(self.url(FIND_PATH)?)
            .header(CONTENT_TYPE, API_CONTENT_TYPE)
            .header(AUTHORIZATION, &self.api_key)
            .query(&[
                ("limit", params.limit.to_string()),
                ("page", params.page.to_string()),
                ("type", params.animal_type.clone()),
                ("location", params.zip.clone()),
                ("radius", params.radius_miles.to_string()),
            ])
            .send()
            .await?;

        read_response(response).await
    }

    async fn search_pets(
        &self,
        species: Species,
        request: &SearchRequest,
    ) -> ApiResult<SearchResponse> {
        let path = format!("animals/search/available/{}/haspic/", species.as_str());
        log::debug!("[Api] POST {}", path);

        let response = self
            .client
            .post(self.url(&path)?)
            .header(CONTENT_TYPE, API_CONTENT_TYPE)
            .header(AUTHORIZATION, &self.api_key)
            .query(&[
                ("sort", SEARCH_SORT.to_string()),
                ("limit", self.page_limit.to_string()),
                ("include", SEARCH_INCLUDE.to_string()),
            ])
            .body(serde_json::to_vec(request)?)
            .send()
            .await?;

        read_response(response).await
    }
}

/// Decodes a success body, or turns an error status into `ApiError::Status`.
async fn read_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let detail = error_detail(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string());
        log::warn!("[Api] Request failed with {}: {}", status, detail);
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// The `detail` of the first entry in a JSON:API `errors` array.
fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<SearchResponse>(body)
        .ok()?
        .errors?
        .into_iter()
        .next()?
        .detail
}

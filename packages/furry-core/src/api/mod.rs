//! RescueGroups v5 API access.
//!
//! - `types` - JSON:API request/response models
//! - `client` - `PetsApi` trait and its HTTP implementation
//! - `retry` - Capped exponential backoff for transient failures

pub mod client;
pub mod retry;
pub mod types;

pub use client::{ApiError, ApiResult, FindParams, PetsApi, RescueGroupsClient};
pub use retry::{with_retry, RetryError, RetryPolicy, Transient};
pub use types::{
    filter_available, organization_for_animal, FindResponse, IncludedItem, ResourceItem,
    SearchRequest, SearchResponse, Species,
};

//! Simple nearby-pets listing with retry.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::{filter_available, with_retry, FindParams, FindResponse, PetsApi, RetryPolicy};
use crate::error::{FurryError, FurryResult};
use crate::zipcode::validate_zip;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindState {
    pub loading: bool,
    /// Adoptable animals only.
    pub items: Option<FindResponse>,
    pub error: Option<String>,
}

/// Service behind the "find pets" screen.
pub struct FindService {
    api: Arc<dyn PetsApi>,
    retry: RetryPolicy,
    radius_miles: u32,
    page_limit: u32,
    state: watch::Sender<FindState>,
}

impl FindService {
    /// Creates a new FindService.
    ///
    /// # Arguments
    /// * `api` - Pet listing API
    /// * `retry` - Backoff for transient failures
    /// * `radius_miles` - Search radius around the ZIP
    /// * `page_limit` - Page size
    pub fn new(
        api: Arc<dyn PetsApi>,
        retry: RetryPolicy,
        radius_miles: u32,
        page_limit: u32,
    ) -> Self {
        Self {
            api,
            retry,
            radius_miles,
            page_limit,
            state: watch::channel(FindState::default()).0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FindState> {
        self.state.subscribe()
    }

    /// Fetches available pets near `zip`, retrying transient failures.
    ///
    /// Animals already marked adopted are dropped before publishing.
    pub async fn get_pet_data(&self, zip: &str) -> FurryResult<FindResponse> {
        let zip = match validate_zip(zip) {
            Ok(zip) => zip,
            Err(e) => {
                self.publish_error(e.to_string());
                return Err(e.into());
            }
        };

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let params = FindParams {
            limit: self.page_limit,
            radius_miles: self.radius_miles,
            ..FindParams::near(zip)
        };

        match with_retry("get_available_pets", &self.retry, || {
            self.api.get_available_pets(&params)
        })
        .await
        {
            Ok(response) => {
                let available = filter_available(response);
                log::info!("[Find] {} available animals", available.data.len());
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.items = Some(available.clone());
                    state.error = None;
                });
                tracing::debug!(count = available.data.len(), "find_state");
                Ok(available)
            }
            Err(e) => {
                self.publish_error(e.to_string());
                Err(FurryError::from(e))
            }
        }
    }

    /// Forgets results and errors.
    pub fn clear_pet_data(&self) {
        self.state.send_replace(FindState::default());
    }

    fn publish_error(&self, message: String) {
        log::warn!("[Find] {}", message);
        tracing::debug!(error = %message, "find_state");
        self.state.send_modify(|state| {
            state.loading = false;
            state.error = Some(message);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::api::{ApiError, ApiResult, SearchRequest, SearchResponse, Species};

    /// Fails the first `failures` calls, then returns a fixed listing.
    struct FlakyApi {
        calls: AtomicUsize,
        failures: usize,
        fatal: bool,
    }

    impl FlakyApi {
        fn new(failures: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures,
                fatal: false,
            }
        }
    }

    #[async_trait]
    impl PetsApi for FlakyApi {
        async fn get_available_pets(&self, params: &FindParams) -> ApiResult<FindResponse> {
            assert_eq!(params.zip, "92692");
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fatal {
                return Err(ApiError::Status {
                    status: 401,
                    detail: "Unauthorized".into(),
                });
            }
            if call < self.failures {
                return Err(refused().await);
            }
            Ok(serde_json::from_value(json!({
                "data": [
                    { "attributes": { "name": "Milo" } },
                    { "attributes": { "name": "Pepper (ADOPTED)" } },
                    null
                ]
            }))
            .unwrap())
        }

        async fn search_pets(
            &self,
            _species: Species,
            _request: &SearchRequest,
        ) -> ApiResult<SearchResponse> {
            unreachable!("find never uses the advanced endpoint")
        }
    }

    /// A genuine connect error from a port nothing listens on.
    async fn refused() -> ApiError {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        reqwest::get(format!("http://{addr}/")).await.unwrap_err().into()
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            initial_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(2),
        }
    }

    fn service(api: &Arc<FlakyApi>) -> FindService {
        FindService::new(Arc::clone(api) as Arc<dyn PetsApi>, fast_policy(), 25, 30)
    }

    #[tokio::test]
    async fn transient_failures_are_retried_and_adopted_filtered() {
        let api = Arc::new(FlakyApi::new(2));
        let service = service(&api);

        let response = service.get_pet_data("92692").await.unwrap();

        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
        assert_eq!(response.data.len(), 1);
        let state = service.subscribe().borrow().clone();
        assert!(!state.loading);
        assert_eq!(state.items, Some(response));
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn exhausted_retries_report_attempts() {
        let api = Arc::new(FlakyApi::new(usize::MAX));
        let service = service(&api);

        assert!(service.get_pet_data("92692").await.is_err());

        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
        let error = service.subscribe().borrow().error.clone().unwrap();
        assert!(error.starts_with("Network error after 3 attempts:"), "{error}");
    }

    #[tokio::test]
    async fn status_errors_are_not_retried() {
        let api = Arc::new(FlakyApi {
            fatal: true,
            ..FlakyApi::new(0)
        });
        let service = service(&api);

        assert!(service.get_pet_data("92692").await.is_err());

        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
        let error = service.subscribe().borrow().error.clone().unwrap();
        assert!(error.starts_with("Unexpected error:"), "{error}");
    }

    #[tokio::test]
    async fn invalid_zip_skips_api_and_clear_resets() {
        let api = Arc::new(FlakyApi::new(0));
        let service = service(&api);

        assert!(service.get_pet_data("9269").await.is_err());
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert!(service.subscribe().borrow().error.is_some());

        service.clear_pet_data();
        assert_eq!(*service.subscribe().borrow(), FindState::default());
    }
}

//! Advanced pet search by species and ZIP.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::{ApiError, PetsApi, SearchRequest, SearchResponse, Species};
use crate::error::{FurryError, FurryResult};
use crate::zipcode::{is_unrecognized_postal_code, normalize_zip_input, ZipError, ZIP_LEN};

/// Shown when a search is attempted without a complete ZIP.
pub const ZIP_REQUIRED_MESSAGE: &str = "Please enter a 5-digit ZIP code.";

/// ZIP entry state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZipState {
    /// Digits entered so far; `None` when nothing usable was typed.
    pub zip: Option<String>,
    /// Some digits were typed but not five.
    pub zip_error: bool,
    /// The API rejected the ZIP as unknown.
    pub invalid_zip_provided: bool,
}

/// Search results state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub loading: bool,
    pub items: Option<SearchResponse>,
    pub error: Option<String>,
}

/// Service behind the search screen.
pub struct SearchService {
    api: Arc<dyn PetsApi>,
    radius_miles: u32,
    zip: watch::Sender<ZipState>,
    species: watch::Sender<Species>,
    search: watch::Sender<SearchState>,
}

impl SearchService {
    /// Creates a new SearchService.
    ///
    /// # Arguments
    /// * `api` - Pet listing API
    /// * `radius_miles` - Search radius around the entered ZIP
    pub fn new(api: Arc<dyn PetsApi>, radius_miles: u32) -> Self {
        Self {
            api,
            radius_miles,
            zip: watch::channel(ZipState::default()).0,
            species: watch::channel(Species::default()).0,
            search: watch::channel(SearchState::default()).0,
        }
    }

    pub fn zip_state(&self) -> watch::Receiver<ZipState> {
        self.zip.subscribe()
    }

    pub fn selected_species(&self) -> watch::Receiver<Species> {
        self.species.subscribe()
    }

    pub fn search_state(&self) -> watch::Receiver<SearchState> {
        self.search.subscribe()
    }

    /// Normalizes typed ZIP input.
    pub fn update_zip_input(&self, raw: &str) {
        let input = normalize_zip_input(raw);
        self.zip.send_modify(|state| {
            state.zip = input.zip().map(str::to_string);
            state.zip_error = input.is_incomplete();
        });
        tracing::debug!(zip = ?input.zip(), incomplete = input.is_incomplete(), "zip_input");
    }

    pub fn select_species(&self, species: Species) {
        self.species.send_replace(species);
        tracing::debug!(%species, "species_selected");
    }

    /// Searches for `species` around the current ZIP.
    ///
    /// Without a complete ZIP the API is not called and the search state
    /// carries an error instead.
    pub async fn search_pets(&self, species: Species) -> FurryResult<SearchResponse> {
        let zip = match self.complete_zip() {
            Ok(zip) => zip,
            Err(e) => {
                log::info!("[Search] Not searching: {}", e);
                self.zip.send_modify(|state| state.zip_error = true);
                self.search.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(ZIP_REQUIRED_MESSAGE.to_string());
                });
                return Err(e.into());
            }
        };

        self.search.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
        log::info!("[Search] Searching {} within {}mi of {}", species, self.radius_miles, zip);

        let request = SearchRequest::within_radius(self.radius_miles, zip);
        match self.api.search_pets(species, &request).await {
            Ok(response) => {
                log::info!("[Search] Found {} animals", response.data.len());
                self.search.send_modify(|state| {
                    state.loading = false;
                    state.items = Some(response.clone());
                    state.error = None;
                });
                self.zip.send_modify(|state| state.invalid_zip_provided = false);
                Ok(response)
            }
            Err(e) => {
                let message = e.user_message();
                log::warn!("[Search] Search failed: {}", message);
                if let ApiError::Status { detail, .. } = &e {
                    let unknown_zip = is_unrecognized_postal_code(detail);
                    self.zip
                        .send_modify(|state| state.invalid_zip_provided = unknown_zip);
                }
                self.search.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                Err(FurryError::from(e))
            }
        }
    }

    /// Forgets the entered ZIP and its error flags.
    pub fn clear_zip(&self) {
        self.zip.send_replace(ZipState::default());
    }

    /// Forgets results and errors.
    pub fn clear_search_data(&self) {
        self.zip.send_modify(|state| state.invalid_zip_provided = false);
        self.search.send_replace(SearchState::default());
    }

    fn complete_zip(&self) -> Result<String, ZipError> {
        let state = self.zip.borrow();
        match state.zip.as_deref() {
            None => Err(ZipError::Empty),
            Some(zip) if zip.len() != ZIP_LEN => Err(ZipError::WrongLength(zip.len())),
            Some(zip) => Ok(zip.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::api::{ApiResult, FindParams, FindResponse};

    /// Search API double that records requests.
    #[derive(Default)]
    struct MockApi {
        calls: AtomicUsize,
        last_request: Mutex<Option<(Species, SearchRequest)>>,
        reject_with: Option<(u16, &'static str)>,
    }

    #[async_trait]
    impl PetsApi for MockApi {
        async fn get_available_pets(&self, _params: &FindParams) -> ApiResult<FindResponse> {
            unreachable!("search never uses the simple endpoint")
        }

        async fn search_pets(
            &self,
            species: Species,
            request: &SearchRequest,
        ) -> ApiResult<SearchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock() = Some((species, request.clone()));
            match self.reject_with {
                Some((status, detail)) => Err(ApiError::Status {
                    status,
                    detail: detail.to_string(),
                }),
                None => Ok(SearchResponse::default()),
            }
        }
    }

    fn service(api: &Arc<MockApi>) -> SearchService {
        SearchService::new(Arc::clone(api) as Arc<dyn PetsApi>, 10)
    }

    #[test]
    fn zip_input_tracks_completeness() {
        let api = Arc::new(MockApi::default());
        let service = service(&api);
        let zip = service.zip_state();

        service.update_zip_input("9a2");
        assert_eq!(zip.borrow().zip.as_deref(), Some("92"));
        assert!(zip.borrow().zip_error);

        service.update_zip_input("92692-1234");
        assert_eq!(zip.borrow().zip.as_deref(), Some("92692"));
        assert!(!zip.borrow().zip_error);

        service.update_zip_input("abc");
        assert_eq!(zip.borrow().zip, None);
        assert!(!zip.borrow().zip_error);
    }

    #[tokio::test]
    async fn missing_or_partial_zip_skips_api() {
        let api = Arc::new(MockApi::default());
        let service = service(&api);

        let err = service.search_pets(Species::Cats).await.unwrap_err();
        assert!(matches!(err, FurryError::InvalidZip(ZipError::Empty)));

        service.update_zip_input("926");
        let err = service.search_pets(Species::Cats).await.unwrap_err();
        assert!(matches!(err, FurryError::InvalidZip(ZipError::WrongLength(3))));

        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        let search = service.search_state();
        assert_eq!(search.borrow().error.as_deref(), Some(ZIP_REQUIRED_MESSAGE));
        assert!(service.zip_state().borrow().zip_error);
    }

    #[tokio::test]
    async fn search_sends_species_and_radius() {
        let api = Arc::new(MockApi::default());
        let service = service(&api);
        service.update_zip_input("02134");

        service.search_pets(Species::Rabbits).await.unwrap();

        let (species, request) = api.last_request.lock().clone().unwrap();
        assert_eq!(species, Species::Rabbits);
        assert_eq!(request, SearchRequest::within_radius(10, "02134"));

        let search = service.search_state();
        assert!(!search.borrow().loading);
        assert!(search.borrow().items.is_some());
        assert_eq!(search.borrow().error, None);
    }

    #[tokio::test]
    async fn unrecognized_postal_code_sets_flag() {
        let api = Arc::new(MockApi {
            reject_with: Some((400, "Value 00000 is not a recognized postalcode")),
            ..Default::default()
        });
        let service = service(&api);
        service.update_zip_input("00000");

        assert!(service.search_pets(Species::Dogs).await.is_err());

        assert!(service.zip_state().borrow().invalid_zip_provided);
        assert_eq!(
            service.search_state().borrow().error.as_deref(),
            Some("Value 00000 is not a recognized postalcode")
        );
    }

    #[tokio::test]
    async fn other_api_errors_do_not_flag_zip() {
        let api = Arc::new(MockApi {
            reject_with: Some((401, "Unauthorized")),
            ..Default::default()
        });
        let service = service(&api);
        service.update_zip_input("92692");

        assert!(service.search_pets(Species::Dogs).await.is_err());
        assert!(!service.zip_state().borrow().invalid_zip_provided);
    }

    #[tokio::test]
    async fn clearing_resets_state() {
        let api = Arc::new(MockApi {
            reject_with: Some((400, "not a recognized postalcode")),
            ..Default::default()
        });
        let service = service(&api);
        service.update_zip_input("00000");
        let _ = service.search_pets(Species::Cats).await;

        service.clear_search_data();
        assert_eq!(*service.search_state().borrow(), SearchState::default());
        assert!(!service.zip_state().borrow().invalid_zip_provided);
        assert_eq!(service.zip_state().borrow().zip.as_deref(), Some("00000"));

        service.clear_zip();
        assert_eq!(*service.zip_state().borrow(), ZipState::default());
    }

    #[test]
    fn species_selection_is_observable() {
        let api = Arc::new(MockApi::default());
        let service = service(&api);
        let selected = service.selected_species();
        assert_eq!(*selected.borrow(), Species::Cats);

        service.select_species(Species::Turtles);
        assert_eq!(*selected.borrow(), Species::Turtles);
    }
}

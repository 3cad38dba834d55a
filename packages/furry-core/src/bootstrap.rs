//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root, the single place where all
//! services are instantiated and wired together. Front ends supply the
//! platform pieces (permission check, location provider, settings store);
//! everything HTTP-backed is built here from [`Config`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::api::{PetsApi, RescueGroupsClient};
use crate::error::{FurryError, FurryResult};
use crate::location::{
    Geocoder, LocationProvider, NominatimGeocoder, PermissionChecker, Priority, ZipResolver,
};
use crate::services::{FindService, SearchService, SettingsService};
use crate::state::{Config, SettingsStore};

/// Platform pieces a front end must provide.
pub struct Platform {
    pub permission: Arc<dyn PermissionChecker>,
    pub provider: Arc<dyn LocationProvider>,
    pub store: Arc<dyn SettingsStore>,
}

/// Container for all bootstrapped services.
#[derive(Clone)]
pub struct BootstrappedServices {
    /// Location-to-ZIP resolver shared by the settings service.
    pub resolver: Arc<ZipResolver>,
    pub settings: Arc<SettingsService>,
    pub search: Arc<SearchService>,
    pub find: Arc<FindService>,
    /// Pet listing API client.
    pub api: Arc<dyn PetsApi>,
    /// Shared HTTP client for connection pooling.
    http_client: Client,
}

impl BootstrappedServices {
    /// Returns the shared HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.http_client
    }
}

/// Creates the shared HTTP client for the listing API and the geocoder.
fn create_http_client(timeout_secs: u64) -> FurryResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| FurryError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Bootstraps all services with their dependencies.
///
/// Services are created in dependency order:
///
/// 1. Shared HTTP client
/// 2. API client and geocoder (depend on HTTP client)
/// 3. Resolver (depends on platform pieces and geocoder)
/// 4. Settings, search and find services
///
/// # Errors
///
/// Returns `Configuration` if `config` fails validation or holds an
/// unusable URL.
pub fn bootstrap_services(
    config: &Config,
    platform: Platform,
) -> FurryResult<BootstrappedServices> {
    config.validate().map_err(FurryError::Configuration)?;
    if config.api_key.trim().is_empty() {
        log::warn!("[Bootstrap] No API key configured; listing requests will be rejected");
    }

    let http_client = create_http_client(config.request_timeout_secs)?;

    let api: Arc<dyn PetsApi> = Arc::new(
        RescueGroupsClient::new(http_client.clone(), &config.api_base_url, &config.api_key)
            .map_err(|e| FurryError::Configuration(e.to_string()))?
            .with_page_limit(config.page_limit),
    );

    let geocoder: Arc<dyn Geocoder> = Arc::new(
        NominatimGeocoder::new(
            http_client.clone(),
            &config.geocoder_base_url,
            &config.geocoder_user_agent,
        )
        .map_err(|e| FurryError::Configuration(e.to_string()))?,
    );

    let resolver = Arc::new(ZipResolver::new(
        platform.permission,
        platform.provider,
        geocoder,
        config
            .location
            .resolver_config(Priority::BalancedPowerAccuracy),
    ));

    let settings = Arc::new(SettingsService::new(Arc::clone(&resolver), platform.store));
    let search = Arc::new(SearchService::new(
        Arc::clone(&api),
        config.search_radius_miles,
    ));
    let find = Arc::new(FindService::new(
        Arc::clone(&api),
        config.retry,
        config.find_radius_miles,
        config.page_limit,
    ));

    log::info!("[Bootstrap] Services ready (api={})", config.api_base_url);

    Ok(BootstrappedServices {
        resolver,
        settings,
        search,
        find,
        api,
        http_client,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{ConfiguredLocationProvider, StaticPermission};
    use crate::state::MemorySettingsStore;

    fn platform() -> Platform {
        Platform {
            permission: Arc::new(StaticPermission::granted()),
            provider: Arc::new(ConfiguredLocationProvider::new(None)),
            store: Arc::new(MemorySettingsStore::default()),
        }
    }

    #[tokio::test]
    async fn default_config_bootstraps() {
        let services = bootstrap_services(&Config::default(), platform()).unwrap();
        assert!(services.settings.is_coarse_permission_granted());
        assert!(!services.resolver.is_loading());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = Config {
            page_limit: 0,
            ..Config::default()
        };
        let err = bootstrap_services(&config, platform()).err().unwrap();
        assert!(matches!(err, FurryError::Configuration(_)));

        let config = Config {
            geocoder_base_url: "no scheme here".into(),
            ..Config::default()
        };
        assert!(bootstrap_services(&config, platform()).is_err());
    }
}

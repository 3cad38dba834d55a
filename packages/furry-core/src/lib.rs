//! Furry Core - shared library for Furry Friends.
//!
//! This crate provides the core functionality for Furry Friends, a pet
//! adoption browser backed by the RescueGroups API. Screens are modelled as
//! headless services with observable state so any front end (the bundled
//! CLI, a mobile shell) can drive them.
//!
//! # Architecture
//!
//! - [`location`]: Location-to-ZIP resolution with a fallback chain
//! - [`api`]: RescueGroups client, models and retry
//! - [`services`]: Settings, search and find state holders
//! - [`state`]: Configuration and persisted settings
//! - [`zipcode`], [`names`], [`share`]: Input and presentation helpers
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! Platform-specific behavior sits behind traits:
//!
//! - [`PermissionChecker`](location::PermissionChecker): Location permission
//! - [`LocationProvider`](location::LocationProvider): Device positioning
//! - [`Geocoder`](location::Geocoder): Reverse geocoding
//! - [`PetsApi`](api::PetsApi): Pet listings
//! - [`SettingsStore`](state::SettingsStore): Preference persistence
//!
//! Each has an implementation usable off-device: [`StaticPermission`],
//! [`ConfiguredLocationProvider`], [`NominatimGeocoder`],
//! [`RescueGroupsClient`] and [`JsonSettingsStore`].

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod bootstrap;
pub mod error;
pub mod location;
pub mod names;
pub mod protocol_constants;
pub mod services;
pub mod share;
pub mod state;
pub mod utils;
pub mod zipcode;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export commonly used types at the crate root
pub use error::{ApiResult, ErrorCode, FurryError, FurryResult, LocationResult};
pub use names::{format_pet_name, proper_case};
pub use share::{dial_uri, normalize_web_url, share_message, ShareListing};
pub use state::{
    Config, JsonSettingsStore, LocationConfig, MemorySettingsStore, Settings, SettingsStore,
};
pub use zipcode::{normalize_zip_input, validate_zip, ZipError, ZipInput};

// Re-export location types
pub use location::{
    ConfiguredLocationProvider, Coordinate, NominatimGeocoder, ResolutionResult, ResolverConfig,
    StaticPermission, ZipResolver,
};

// Re-export API types
pub use api::{PetsApi, RescueGroupsClient, RetryPolicy, Species};

// Re-export service types
pub use services::{FindService, ResolveHandle, SearchService, SettingsService};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, BootstrappedServices, Platform};

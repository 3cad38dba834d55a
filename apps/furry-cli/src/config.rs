//! CLI configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use furry_core::{Config, Coordinate, LocationConfig, RetryPolicy};
use serde::Deserialize;

/// CLI configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// RescueGroups API key.
    /// Override: `FURRY_API_KEY`
    pub api_key: String,

    /// RescueGroups API root, if not the public default.
    pub api_base_url: Option<String>,

    /// Latitude served as the device's cached location.
    /// Override: `FURRY_LATITUDE`
    pub latitude: Option<f64>,

    /// Longitude served as the device's cached location.
    /// Override: `FURRY_LONGITUDE`
    pub longitude: Option<f64>,

    /// Whether location use is permitted at all.
    pub location_permission: bool,

    /// Directory for persistent settings.
    /// Override: `FURRY_DATA_DIR` (handled by clap)
    pub data_dir: Option<PathBuf>,

    /// Advanced search radius (miles).
    pub search_radius_miles: Option<u32>,

    /// Simple search radius (miles).
    pub find_radius_miles: Option<u32>,

    /// Reverse geocoder root, if not the public Nominatim instance.
    pub geocoder_base_url: Option<String>,

    /// Resolver timings.
    pub location: LocationConfig,

    /// Backoff for the simple search.
    pub retry: RetryPolicy,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: None,
            latitude: None,
            longitude: None,
            location_permission: true,
            data_dir: None,
            search_radius_miles: None,
            find_radius_miles: None,
            geocoder_base_url: None,
            location: LocationConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FURRY_API_KEY") {
            if !val.trim().is_empty() {
                self.api_key = val;
            }
        }

        if let Ok(val) = std::env::var("FURRY_LATITUDE") {
            if let Ok(lat) = val.parse() {
                self.latitude = Some(lat);
            }
        }

        if let Ok(val) = std::env::var("FURRY_LONGITUDE") {
            if let Ok(lon) = val.parse() {
                self.longitude = Some(lon);
            }
        }

        // Note: FURRY_DATA_DIR is handled by clap via #[arg(env = ...)] in main.rs
    }

    /// The configured position, if both halves are set.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }

    /// Converts to furry-core's Config type.
    pub fn to_core_config(&self) -> Config {
        let defaults = Config::default();
        Config {
            api_key: self.api_key.clone(),
            api_base_url: self
                .api_base_url
                .clone()
                .unwrap_or(defaults.api_base_url),
            search_radius_miles: self
                .search_radius_miles
                .unwrap_or(defaults.search_radius_miles),
            find_radius_miles: self
                .find_radius_miles
                .unwrap_or(defaults.find_radius_miles),
            geocoder_base_url: self
                .geocoder_base_url
                .clone()
                .unwrap_or(defaults.geocoder_base_url),
            location: self.location.clone(),
            retry: self.retry,
            ..defaults
        }
    }
}

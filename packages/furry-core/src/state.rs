//! Configuration and persisted user settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::api::RetryPolicy;
use crate::location::{Priority, ResolverConfig};
use crate::protocol_constants::{
    API_TIMEOUT_SECS, DEFAULT_FIND_RADIUS_MILES, DEFAULT_GEOCODER_USER_AGENT, DEFAULT_PAGE_LIMIT,
    DEFAULT_SEARCH_RADIUS_MILES, NOMINATIM_BASE_URL, RESCUE_GROUPS_BASE_URL,
};

/// File name for persisted settings.
const SETTINGS_FILE: &str = "settings.json";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Timings for location-to-ZIP resolution.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    /// Delay before re-reading the cached location (milliseconds).
    pub cache_recheck_delay_ms: u64,

    /// Cached-location re-reads after the first miss.
    pub cache_rechecks: u32,

    /// Bound on the one-shot fresh fix (milliseconds).
    pub current_location_timeout_ms: u64,

    /// Ceiling on waiting for a subscription update (milliseconds).
    pub subscription_timeout_ms: u64,
}

impl LocationConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.subscription_timeout_ms == 0 {
            return Err("subscription_timeout_ms must be >= 1".to_string());
        }
        if self.current_location_timeout_ms == 0 {
            return Err("current_location_timeout_ms must be >= 1".to_string());
        }
        Ok(())
    }

    /// Builds the resolver configuration at the given priority.
    pub fn resolver_config(&self, priority: Priority) -> ResolverConfig {
        ResolverConfig {
            priority,
            cache_recheck_delay: Duration::from_millis(self.cache_recheck_delay_ms),
            cache_rechecks: self.cache_rechecks,
            current_location_timeout: Duration::from_millis(self.current_location_timeout_ms),
            subscription_timeout: Duration::from_millis(self.subscription_timeout_ms),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        let resolver = ResolverConfig::default();
        Self {
            cache_recheck_delay_ms: resolver.cache_recheck_delay.as_millis() as u64,
            cache_rechecks: resolver.cache_rechecks,
            current_location_timeout_ms: resolver.current_location_timeout.as_millis() as u64,
            subscription_timeout_ms: resolver.subscription_timeout.as_millis() as u64,
        }
    }
}

/// Configuration for the Furry Friends core.
///
/// All fields have sensible defaults except `api_key`, which must be set
/// before the pet listing API will answer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    // API
    /// RescueGroups API root.
    pub api_base_url: String,

    /// RescueGroups API key, sent as the `Authorization` header.
    pub api_key: String,

    /// Timeout for each HTTP request (seconds).
    pub request_timeout_secs: u64,

    /// Page size for searches.
    pub page_limit: u32,

    /// Radius of the advanced search (miles).
    pub search_radius_miles: u32,

    /// Radius of the simple search (miles).
    pub find_radius_miles: u32,

    /// Backoff for the simple search.
    pub retry: RetryPolicy,

    // Location
    pub location: LocationConfig,

    /// Reverse geocoding service root.
    pub geocoder_base_url: String,

    /// User-Agent sent to the geocoder.
    pub geocoder_user_agent: String,
}

impl Config {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.page_limit == 0 {
            return Err("page_limit must be >= 1".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be >= 1".to_string());
        }
        if self.search_radius_miles == 0 || self.find_radius_miles == 0 {
            return Err("search radii must be >= 1 mile".to_string());
        }
        self.location.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: RESCUE_GROUPS_BASE_URL.to_string(),
            api_key: String::new(),
            request_timeout_secs: API_TIMEOUT_SECS,
            page_limit: DEFAULT_PAGE_LIMIT,
            search_radius_miles: DEFAULT_SEARCH_RADIUS_MILES,
            find_radius_miles: DEFAULT_FIND_RADIUS_MILES,
            retry: RetryPolicy::default(),
            location: LocationConfig::default(),
            geocoder_base_url: NOMINATIM_BASE_URL.to_string(),
            geocoder_user_agent: DEFAULT_GEOCODER_USER_AGENT.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Persisted Settings
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences that survive restarts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub dark_theme_enabled: bool,
}

/// Trait for loading and saving [`Settings`].
pub trait SettingsStore: Send + Sync {
    /// Loads settings, falling back to defaults on any problem.
    fn load(&self) -> Settings;

    /// Persists settings.
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

/// Stores settings as `settings.json` in a data directory.
#[derive(Debug)]
pub struct JsonSettingsStore {
    data_dir: PathBuf,
    /// Serializes writers so temp files never interleave.
    write_lock: Mutex<()>,
}

impl JsonSettingsStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the settings file.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    fn temp_path(&self) -> PathBuf {
        self.data_dir.join(format!("{SETTINGS_FILE}.tmp"))
    }
}

impl SettingsStore for JsonSettingsStore {
    /// Returns defaults if the file doesn't exist or is invalid.
    fn load(&self) -> Settings {
        let path = self.path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("[Settings] Ignoring corrupt {}: {}", path.display(), e);
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    /// Uses atomic write (temp file + rename) to prevent corruption on crash.
    /// Creates the directory if it doesn't exist.
    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        let _guard = self.write_lock.lock();
        std::fs::create_dir_all(&self.data_dir)?;
        let temp_path = self.temp_path();
        let contents = serde_json::to_string_pretty(settings)?;

        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, self.path())
    }
}

/// Keeps settings in memory only.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        *self.settings.read()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        *self.settings.write() = *settings;
        Ok(())
    }
}

/// Resolves the data directory: explicit override, else `./.furry-friends`.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> PathBuf {
    override_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".furry-friends"))
}

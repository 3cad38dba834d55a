//! Settings screen state: location-derived ZIP and theme preference.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::location::{
    ResolutionResult, ZipResolver, CANCELLED_REASON, GEOCODE_FAILED_REASON, NO_LOCATION_REASON,
};
use crate::state::{Settings, SettingsStore};
use crate::zipcode::manual_zip;

pub const PERMISSION_MESSAGE: &str = "Location permission not granted.";
pub const NO_LOCATION_MESSAGE: &str =
    "No recent location available. Please enable device Location or try again.";
pub const GEOCODE_MESSAGE: &str = "Could not resolve postal code from location.";
pub const LOCATION_ERROR_MESSAGE: &str = "Error retrieving location.";

/// Observable settings state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsState {
    /// Last ZIP resolved from location or entered by hand.
    pub zip: Option<String>,
    /// True while a location resolution is running.
    pub loading: bool,
    /// User-facing outcome of the last resolution, if it failed.
    pub message: Option<String>,
    pub dark_theme_enabled: bool,
}

/// Handle to a spawned resolution.
pub struct ResolveHandle {
    cancel: CancellationToken,
    task: JoinHandle<ResolutionResult>,
}

impl ResolveHandle {
    /// Requests cancellation; the open subscription, if any, is torn down.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the resolution to finish.
    pub async fn join(self) -> ResolutionResult {
        self.task.await.unwrap_or_else(|e| {
            log::error!("[Settings] Location task failed: {}", e);
            ResolutionResult::Unavailable(LOCATION_ERROR_MESSAGE.to_string())
        })
    }
}

/// Maps a failed resolution to the message shown to the user.
///
/// Cancellation is silent.
pub fn message_for(result: &ResolutionResult) -> Option<&'static str> {
    match result {
        ResolutionResult::Success(_) => None,
        ResolutionResult::PermissionDenied => Some(PERMISSION_MESSAGE),
        ResolutionResult::Unavailable(reason) => match reason.as_str() {
            NO_LOCATION_REASON => Some(NO_LOCATION_MESSAGE),
            GEOCODE_FAILED_REASON => Some(GEOCODE_MESSAGE),
            CANCELLED_REASON => None,
            _ => Some(LOCATION_ERROR_MESSAGE),
        },
    }
}

/// Service behind the settings screen.
pub struct SettingsService {
    resolver: Arc<ZipResolver>,
    store: Arc<dyn SettingsStore>,
    state: watch::Sender<SettingsState>,
    /// Cancels the in-flight resolution.
    active: Mutex<Option<CancellationToken>>,
    /// Bumped per request so stale results are dropped.
    generation: AtomicU64,
}

impl SettingsService {
    /// Creates the service, seeding the theme from `store`.
    pub fn new(resolver: Arc<ZipResolver>, store: Arc<dyn SettingsStore>) -> Self {
        let settings = store.load();
        let (state, _) = watch::channel(SettingsState {
            dark_theme_enabled: settings.dark_theme_enabled,
            ..Default::default()
        });
        Self {
            resolver,
            store,
            state,
            active: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SettingsState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SettingsState {
        self.state.borrow().clone()
    }

    pub fn is_coarse_permission_granted(&self) -> bool {
        self.resolver.has_permission()
    }

    /// Starts resolving the ZIP from the device location.
    ///
    /// Returns `None` without spawning anything when permission is missing.
    /// A request already in flight is cancelled and its result discarded.
    pub fn fetch_zip_from_location(self: &Arc<Self>) -> Option<ResolveHandle> {
        if !self.resolver.has_permission() {
            log::warn!("[Settings] Location requested without permission");
            self.update(|state| {
                state.zip = None;
                state.loading = false;
                state.message = Some(PERMISSION_MESSAGE.to_string());
            });
            return None;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        if let Some(previous) = self.active.lock().replace(cancel.clone()) {
            previous.cancel();
        }

        self.update(|state| {
            state.loading = true;
            state.message = None;
        });

        let this = Arc::clone(self);
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let result = this.resolver.resolve_with_cancel(&token).await;
            if !this.apply(generation, &result) {
                log::debug!("[Settings] Discarding stale location result: {}", result);
            }
            result
        });

        Some(ResolveHandle { cancel, task })
    }

    /// Cancels the in-flight resolution, if any.
    pub fn cancel_location_request(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.active.lock().take() {
            log::info!("[Settings] Cancelling location request");
            token.cancel();
        }
        self.update(|state| state.loading = false);
    }

    /// Stores a hand-typed ZIP. Blank input clears it.
    pub fn save_manual_zip(&self, raw: &str) -> Option<String> {
        let zip = manual_zip(raw);
        self.update(|state| {
            state.zip = zip.clone();
            state.message = None;
        });
        zip
    }

    /// Updates the theme immediately, then persists it.
    ///
    /// A persistence failure is logged; the in-memory value still changes.
    pub async fn set_dark_theme_enabled(&self, enabled: bool) {
        self.update(|state| state.dark_theme_enabled = enabled);

        let store = Arc::clone(&self.store);
        let settings = Settings {
            dark_theme_enabled: enabled,
        };
        match tokio::task::spawn_blocking(move || store.save(&settings)).await {
            Ok(Ok(())) => log::debug!("[Settings] Saved dark_theme_enabled={}", enabled),
            Ok(Err(e)) => log::error!("[Settings] Failed to save settings: {}", e),
            Err(e) => log::error!("[Settings] Settings save task failed: {}", e),
        }
    }

    /// Applies `result` if `generation` is still the newest request.
    ///
    /// The check runs under the state lock, so a request started
    /// concurrently cannot have its loading state overwritten.
    fn apply(&self, generation: u64, result: &ResolutionResult) -> bool {
        let message = message_for(result).map(str::to_string);
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            state.loading = false;
            match result {
                ResolutionResult::Success(zip) => state.zip = Some(zip.clone()),
                ResolutionResult::Unavailable(reason) if reason == CANCELLED_REASON => {}
                ResolutionResult::PermissionDenied | ResolutionResult::Unavailable(_) => {
                    state.zip = None
                }
            }
            state.message = message;
            true
        });
        if applied {
            self.trace_state();
        }
        applied
    }

    fn update(&self, change: impl FnOnce(&mut SettingsState)) {
        self.state.send_modify(change);
        self.trace_state();
    }

    fn trace_state(&self) {
        let state = self.state.borrow();
        tracing::debug!(
            zip = ?state.zip,
            loading = state.loading,
            message = ?state.message,
            dark_theme = state.dark_theme_enabled,
            "settings_state"
        );
    }
}

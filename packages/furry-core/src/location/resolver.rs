//! Location-to-ZIP resolution.
//!
//! [`ZipResolver`] turns the device's position into a postal code. It walks
//! a fixed fallback chain, cheapest source first, and stops at the first
//! usable coordinate:
//!
//! 1. cached last-known location
//! 2. cached location again after a short delay (providers often fill the
//!    cache asynchronously right after startup)
//! 3. a one-shot fresh fix
//! 4. an active subscription, bounded by a timeout, always torn down
//!
//! The coordinate is then reverse-geocoded. Every provider or geocoder
//! failure is soft: it is logged and the chain moves on, so callers only
//! ever see a [`ResolutionResult`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::subscription::SubscriptionGuard;
use super::traits::{Geocoder, LocationProvider, PermissionChecker};
use super::types::{
    Coordinate, LocationError, LocationSubscription, Priority, ResolutionResult, UpdateRequest,
};

/// Reason reported when no stage produced a coordinate.
pub const NO_LOCATION_REASON: &str = "no recent location available";

/// Reason reported when a coordinate was found but had no postal code.
pub const GEOCODE_FAILED_REASON: &str = "could not resolve postal code";

/// Reason reported when the caller cancelled the resolution.
pub const CANCELLED_REASON: &str = "location request cancelled";

/// Timing and priority knobs for [`ZipResolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Priority for the fresh fix and the subscription.
    pub priority: Priority,
    /// Delay before re-reading the cached location.
    pub cache_recheck_delay: Duration,
    /// How many times the cache is re-read after an initial miss.
    pub cache_rechecks: u32,
    /// Upper bound on the one-shot fresh fix.
    pub current_location_timeout: Duration,
    /// Ceiling on waiting for the first subscription update.
    pub subscription_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            priority: Priority::BalancedPowerAccuracy,
            cache_recheck_delay: Duration::from_millis(500),
            cache_rechecks: 1,
            current_location_timeout: Duration::from_secs(10),
            subscription_timeout: Duration::from_secs(8),
        }
    }
}

/// Fallback chain states, visited strictly top to bottom.
#[derive(Debug, Clone, PartialEq)]
enum ResolveStage {
    CheckingCache,
    RecheckingCache { remaining: u32 },
    CheckingFresh,
    Subscribing,
    Geocoding(Coordinate),
    Done(ResolutionResult),
}

/// Counts in-flight resolutions and mirrors "any running" into a watch flag.
struct LoadingState {
    in_flight: Mutex<usize>,
    flag: watch::Sender<bool>,
}

/// Holds the loading flag high for as long as it lives.
///
/// Overlapping resolutions each hold one; the flag drops only when the last
/// guard does.
struct LoadingFlag<'a>(&'a LoadingState);

impl<'a> LoadingFlag<'a> {
    fn raise(state: &'a LoadingState) -> Self {
        let mut in_flight = state.in_flight.lock();
        *in_flight += 1;
        state.flag.send_replace(true);
        Self(state)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.0.in_flight.lock();
        *in_flight = in_flight.saturating_sub(1);
        if *in_flight == 0 {
            self.0.flag.send_replace(false);
        }
    }
}

/// Resolves the device's current postal code.
///
/// Overlapping calls run independently; the loading flag stays raised until
/// the last of them finishes.
pub struct ZipResolver {
    permission: Arc<dyn PermissionChecker>,
    provider: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn Geocoder>,
    config: ResolverConfig,
    loading: LoadingState,
}

impl ZipResolver {
    /// Creates a new resolver.
    ///
    /// # Arguments
    /// * `permission` - Coarse-location permission check
    /// * `provider` - Device location service
    /// * `geocoder` - Reverse geocoder for the final stage
    /// * `config` - Stage timings
    pub fn new(
        permission: Arc<dyn PermissionChecker>,
        provider: Arc<dyn LocationProvider>,
        geocoder: Arc<dyn Geocoder>,
        config: ResolverConfig,
    ) -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            permission,
            provider,
            geocoder,
            config,
            loading: LoadingState {
                in_flight: Mutex::new(0),
                flag,
            },
        }
    }

    /// Returns true if coarse-location permission is currently granted.
    #[must_use]
    pub fn has_permission(&self) -> bool {
        self.permission.has_coarse_location()
    }

    /// Subscribes to the loading flag.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.flag.subscribe()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.loading.flag.borrow()
    }

    /// Resolves the current postal code.
    pub async fn resolve(&self) -> ResolutionResult {
        self.resolve_with_cancel(&CancellationToken::new()).await
    }

    /// Resolves the current postal code, stopping early if `cancel` fires.
    ///
    /// On cancellation any open subscription is removed before returning
    /// `Unavailable`. Dropping the returned future has the same effect.
    pub async fn resolve_with_cancel(&self, cancel: &CancellationToken) -> ResolutionResult {
        if !self.permission.has_coarse_location() {
            log::warn!("[Resolver] Coarse location permission not granted");
            return ResolutionResult::PermissionDenied;
        }

        let _loading = LoadingFlag::raise(&self.loading);

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                log::info!("[Resolver] Resolution cancelled by caller");
                ResolutionResult::Unavailable(CANCELLED_REASON.to_string())
            }
            result = self.run(cancel) => result,
        }
    }

    async fn run(&self, cancel: &CancellationToken) -> ResolutionResult {
        let mut stage = ResolveStage::CheckingCache;
        loop {
            log::debug!("[Resolver] Stage: {:?}", stage);
            stage = match stage {
                ResolveStage::CheckingCache => match self.cached_fix().await {
                    Some(fix) => ResolveStage::Geocoding(fix),
                    None => Self::after_cache_miss(self.config.cache_rechecks),
                },
                ResolveStage::RecheckingCache { remaining } => {
                    log::debug!(
                        "[Resolver] Cached location empty, rechecking in {}ms",
                        self.config.cache_recheck_delay.as_millis()
                    );
                    tokio::time::sleep(self.config.cache_recheck_delay).await;
                    match self.cached_fix().await {
                        Some(fix) => ResolveStage::Geocoding(fix),
                        None => Self::after_cache_miss(remaining.saturating_sub(1)),
                    }
                }
                ResolveStage::CheckingFresh => match self.fresh_fix(cancel).await {
                    Some(fix) => ResolveStage::Geocoding(fix),
                    None => ResolveStage::Subscribing,
                },
                ResolveStage::Subscribing => match self.subscribed_fix().await {
                    Some(fix) => ResolveStage::Geocoding(fix),
                    None => {
                        log::warn!("[Resolver] No recent location available");
                        ResolveStage::Done(ResolutionResult::Unavailable(
                            NO_LOCATION_REASON.to_string(),
                        ))
                    }
                },
                ResolveStage::Geocoding(fix) => ResolveStage::Done(self.geocode(fix).await),
                ResolveStage::Done(result) => return result,
            };
        }
    }

    fn after_cache_miss(remaining: u32) -> ResolveStage {
        if remaining > 0 {
            ResolveStage::RecheckingCache { remaining }
        } else {
            ResolveStage::CheckingFresh
        }
    }

    async fn cached_fix(&self) -> Option<Coordinate> {
        match self.provider.last_location().await {
            Ok(fix) => usable(fix, "cached"),
            Err(e) => {
                log::warn!("[Resolver] Cached location failed: {}", e);
                None
            }
        }
    }

    async fn fresh_fix(&self, cancel: &CancellationToken) -> Option<Coordinate> {
        log::debug!(
            "[Resolver] Requesting fresh fix ({})",
            self.config.priority
        );

        // Cancels the provider's request on every exit path, including timeout.
        let request_cancel = cancel.child_token();
        let _cancel_request = request_cancel.clone().drop_guard();

        let request = self
            .provider
            .current_location(self.config.priority, request_cancel);

        match tokio::time::timeout(self.config.current_location_timeout, request).await {
            Ok(Ok(fix)) => usable(fix, "current"),
            Ok(Err(e)) => {
                log::warn!("[Resolver] Current location failed: {}", e);
                None
            }
            Err(_) => {
                log::warn!(
                    "[Resolver] Current location {}",
                    LocationError::Timeout(self.config.current_location_timeout)
                );
                None
            }
        }
    }

    async fn subscribed_fix(&self) -> Option<Coordinate> {
        let request = UpdateRequest::immediate(self.config.priority);
        let LocationSubscription { id, mut updates } = match self.provider.request_updates(request)
        {
            Ok(subscription) => subscription,
            Err(e) => {
                log::warn!("[Resolver] Requesting location updates failed: {}", e);
                return None;
            }
        };
        let mut guard = SubscriptionGuard::new(self.provider.as_ref(), id);

        log::debug!(
            "[Resolver] Waiting up to {}ms for location update {}",
            self.config.subscription_timeout.as_millis(),
            id
        );

        let fix = tokio::select! {
            fix = first_valid_update(&mut updates) => fix,
            () = tokio::time::sleep(self.config.subscription_timeout) => {
                log::warn!(
                    "[Resolver] Location updates {}",
                    LocationError::Timeout(self.config.subscription_timeout)
                );
                None
            }
        };

        guard.release();
        // Anything delivered after removal is discarded with the receiver.
        drop(updates);
        fix
    }

    async fn geocode(&self, fix: Coordinate) -> ResolutionResult {
        log::debug!("[Resolver] Got location: {}", fix);
        match self.geocoder.postal_code(fix).await {
            Ok(Some(code)) if !code.trim().is_empty() => {
                let code = code.trim().to_string();
                log::info!("[Resolver] Resolved postal code: {}", code);
                ResolutionResult::Success(code)
            }
            Ok(_) => {
                log::warn!("[Resolver] Could not resolve postal code at {}", fix);
                ResolutionResult::Unavailable(GEOCODE_FAILED_REASON.to_string())
            }
            Err(e) => {
                log::warn!("[Resolver] Geocoder failed: {}", e);
                ResolutionResult::Unavailable(GEOCODE_FAILED_REASON.to_string())
            }
        }
    }
}

/// Filters out missing and out-of-range fixes.
fn usable(fix: Option<Coordinate>, source: &str) -> Option<Coordinate> {
    match fix {
        Some(fix) if fix.is_valid() => Some(fix),
        Some(fix) => {
            log::warn!("[Resolver] Ignoring invalid {} location ({})", source, fix);
            None
        }
        None => {
            log::debug!("[Resolver] No {} location", source);
            None
        }
    }
}

async fn first_valid_update(updates: &mut mpsc::Receiver<Coordinate>) -> Option<Coordinate> {
    while let Some(fix) = updates.recv().await {
        if fix.is_valid() {
            return Some(fix);
        }
        log::warn!("[Resolver] Ignoring invalid location update ({})", fix);
    }
    log::debug!("[Resolver] Location updates ended without a fix");
    None
}

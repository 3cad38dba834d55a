//! Trait abstractions for platform location services.
//!
//! The resolver depends on these traits rather than a concrete platform API,
//! so the same fallback chain runs against a phone's fused location service,
//! a fixed configuration, or test doubles.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::types::{
    Coordinate, LocationResult, LocationSubscription, Priority, SubscriptionId, UpdateRequest,
};

/// Trait for checking the coarse-location permission.
pub trait PermissionChecker: Send + Sync {
    /// Returns true if the app may read approximate device position.
    fn has_coarse_location(&self) -> bool;
}

/// Trait for a device location service.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Returns the most recent cached fix without powering up any hardware.
    ///
    /// `Ok(None)` means the cache is empty, which is common right after boot.
    async fn last_location(&self) -> LocationResult<Option<Coordinate>>;

    /// Requests a single fresh fix.
    ///
    /// Implementations must stop work promptly once `cancel` fires.
    ///
    /// # Arguments
    /// * `priority` - Accuracy/power trade-off for the fix
    /// * `cancel` - Fired when the caller no longer wants the result
    async fn current_location(
        &self,
        priority: Priority,
        cancel: CancellationToken,
    ) -> LocationResult<Option<Coordinate>>;

    /// Opens an active subscription delivering fixes on a channel.
    ///
    /// Every successful call must be paired with exactly one
    /// [`remove_updates`](Self::remove_updates) for the returned id.
    fn request_updates(&self, request: UpdateRequest) -> LocationResult<LocationSubscription>;

    /// Stops delivery for a subscription opened by `request_updates`.
    ///
    /// Must not block; called from drop paths.
    fn remove_updates(&self, id: SubscriptionId);
}

/// Trait for reverse geocoding coordinates into postal codes.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns the postal code at `coordinate`, or `Ok(None)` if the service
    /// has no address there (open ocean, unmapped land).
    async fn postal_code(&self, coordinate: Coordinate) -> LocationResult<Option<String>>;
}

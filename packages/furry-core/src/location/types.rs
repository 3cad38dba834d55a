//! Shared types for location resolution.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

/// A WGS84 (latitude, longitude) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if both components are finite and within range.
    ///
    /// Providers occasionally report NaN or (0, 0) placeholders; only the
    /// former is rejected here since (0, 0) is a real place.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat={:.5}, lon={:.5}", self.latitude, self.longitude)
    }
}

/// Trade-off between fix accuracy and power/latency cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    HighAccuracy,
    /// Roughly city-block accuracy; the default for ZIP lookups.
    #[default]
    BalancedPowerAccuracy,
    LowPower,
    /// Only receive fixes requested by other clients.
    Passive,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighAccuracy => write!(f, "high accuracy"),
            Self::BalancedPowerAccuracy => write!(f, "balanced power/accuracy"),
            Self::LowPower => write!(f, "low power"),
            Self::Passive => write!(f, "passive"),
        }
    }
}

/// Parameters for an active location subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRequest {
    pub priority: Priority,
    /// Desired interval between updates.
    pub interval: Duration,
    /// Fastest rate at which updates may be delivered.
    pub min_update_interval: Duration,
    /// Maximum batching delay before delivery.
    pub max_update_delay: Duration,
}

impl UpdateRequest {
    /// A request for the first fix as soon as possible: every interval is zero.
    #[must_use]
    pub fn immediate(priority: Priority) -> Self {
        Self {
            priority,
            interval: Duration::ZERO,
            min_update_interval: Duration::ZERO,
            max_update_delay: Duration::ZERO,
        }
    }
}

/// Identifies an active subscription so it can be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An open location subscription.
///
/// Updates arrive on `updates` until the provider's `remove_updates` is
/// called with `id`.
#[derive(Debug)]
pub struct LocationSubscription {
    pub id: SubscriptionId,
    pub updates: mpsc::Receiver<Coordinate>,
}

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// A postal code was resolved.
    Success(String),
    /// Coarse-location permission was not granted; no location API was touched.
    PermissionDenied,
    /// Resolution failed softly; the string is a short human-readable reason.
    Unavailable(String),
}

impl ResolutionResult {
    /// The resolved postal code, if any.
    #[must_use]
    pub fn postal_code(&self) -> Option<&str> {
        match self {
            Self::Success(code) => Some(code),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for ResolutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(code) => write!(f, "{code}"),
            Self::PermissionDenied => write!(f, "location permission denied"),
            Self::Unavailable(reason) => write!(f, "{reason}"),
        }
    }
}

/// Errors reported by location providers and geocoders.
///
/// The resolver never propagates these; each is logged and converted into a
/// [`ResolutionResult`].
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    /// Permission was revoked between the check and the call.
    #[error("location permission denied")]
    PermissionDenied,

    /// The platform location service is off or failed.
    #[error("location provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Reverse geocoding failed.
    #[error("reverse geocoding failed: {0}")]
    GeocodeFailed(String),

    /// A stage ran past its time budget.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The request was cancelled by the caller.
    #[error("location request cancelled")]
    Cancelled,
}

/// Convenient Result alias for location operations.
pub type LocationResult<T> = Result<T, LocationError>;

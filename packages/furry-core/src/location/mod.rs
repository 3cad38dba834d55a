//! Location-to-ZIP resolution.
//!
//! # Module Structure
//!
//! - `types` - Coordinates, subscription handles, results and errors
//! - `traits` - Permission, provider and geocoder abstractions
//! - `resolver` - The fallback chain ([`ZipResolver`])
//! - `subscription` - Exactly-once subscription teardown
//! - `configured` - Hardware-free provider and permission
//! - `nominatim` - HTTP reverse geocoder

pub mod configured;
pub mod nominatim;
pub mod resolver;
pub(crate) mod subscription;
pub mod traits;
pub mod types;

pub use configured::{ConfiguredLocationProvider, StaticPermission};
pub use nominatim::NominatimGeocoder;
pub use resolver::{
    ResolverConfig, ZipResolver, CANCELLED_REASON, GEOCODE_FAILED_REASON, NO_LOCATION_REASON,
};
pub use traits::{Geocoder, LocationProvider, PermissionChecker};
pub use types::{
    Coordinate, LocationError, LocationResult, LocationSubscription, Priority, ResolutionResult,
    SubscriptionId, UpdateRequest,
};

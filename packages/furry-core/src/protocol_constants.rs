//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by external services (RescueGroups v5 API,
//! Nominatim) and changing them would break compatibility.

// ─────────────────────────────────────────────────────────────────────────────
// RescueGroups v5 Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Base URL of the RescueGroups public API. Paths are joined relative to it.
pub const RESCUE_GROUPS_BASE_URL: &str = "https://api.rescuegroups.org/v5/public/";

/// JSON:API media type required on every request.
pub const API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Path for the simple (unfiltered) animal search.
pub const FIND_PATH: &str = "animals/search";

/// Default page size for both search endpoints.
pub const DEFAULT_PAGE_LIMIT: u32 = 30;

/// Radius used by the simple search when none is configured (miles).
pub const DEFAULT_FIND_RADIUS_MILES: u32 = 25;

/// Radius sent in `filterRadius` for the advanced search (miles).
pub const DEFAULT_SEARCH_RADIUS_MILES: u32 = 10;

/// Sort order for the advanced search.
pub const SEARCH_SORT: &str = "random";

/// Related resources embedded in advanced search responses.
pub const SEARCH_INCLUDE: &str = "pictures,orgs";

/// Relationship/resource type of organizations in `included`.
pub const ORG_RESOURCE_TYPE: &str = "orgs";

/// Phrase the API puts in `errors[].detail` when a ZIP is unknown.
pub const UNRECOGNIZED_POSTAL_CODE_PHRASE: &str = "not a recognized postalcode";

/// Listings whose name contains this marker have already been adopted.
pub const ADOPTED_MARKER: &str = "adopted";

/// Timeout for API HTTP requests (seconds).
pub const API_TIMEOUT_SECS: u64 = 15;

// ─────────────────────────────────────────────────────────────────────────────
// Reverse Geocoding
// ─────────────────────────────────────────────────────────────────────────────

/// Base URL of the public Nominatim instance.
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// Nominatim rejects requests without an identifying User-Agent.
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "furry-friends/0.3 (pet adoption search)";

// ─────────────────────────────────────────────────────────────────────────────
// Presentation
// ─────────────────────────────────────────────────────────────────────────────

/// Shown in place of a pet name that sanitizes to nothing.
pub const NAME_ERROR_PLACEHOLDER: &str = "Name error";

/// Default first line of a shared listing.
pub const DEFAULT_SHARE_SUBJECT: &str = "Give this fur baby a home:";

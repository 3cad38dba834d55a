//! Centralized error types for the Furry Friends core library.
//!
//! Module-level errors ([`ApiError`], [`LocationError`], [`ZipError`],
//! [`RetryError`]) stay close to the code that raises them. [`FurryError`]
//! is the crate-wide type used at service and bootstrap boundaries.

use std::fmt;

use thiserror::Error;

use crate::api::{ApiError, RetryError};
use crate::location::LocationError;
use crate::zipcode::ZipError;

/// Trait for error types that provide machine-readable error codes.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::Status { .. } => "api_error_status",
            Self::Decode(_) => "api_decode_error",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl ErrorCode for LocationError {
    fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "location_permission_denied",
            Self::ProviderUnavailable(_) => "location_provider_unavailable",
            Self::GeocodeFailed(_) => "geocode_failed",
            Self::Timeout(_) => "location_timeout",
            Self::Cancelled => "location_cancelled",
        }
    }
}

impl ErrorCode for ZipError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "zip_empty",
            Self::InvalidCharacters(_) => "zip_invalid_characters",
            Self::WrongLength(_) => "zip_wrong_length",
        }
    }
}

impl<E: fmt::Display> ErrorCode for RetryError<E> {
    fn code(&self) -> &'static str {
        match self {
            Self::Exhausted { .. } => "retries_exhausted",
            Self::Fatal(_) => "non_retryable_error",
        }
    }
}

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum FurryError {
    /// Pet listing API call failed.
    #[error("API request failed: {0}")]
    Api(String),

    /// Location or geocoding failed.
    #[error("Location error: {0}")]
    Location(String),

    /// A ZIP code was rejected.
    #[error("Invalid ZIP code: {0}")]
    InvalidZip(#[from] ZipError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Settings could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ErrorCode for FurryError {
    fn code(&self) -> &'static str {
        match self {
            Self::Api(_) => "api_error",
            Self::Location(_) => "location_error",
            Self::InvalidZip(_) => "invalid_zip",
            Self::Configuration(_) => "configuration_error",
            Self::Storage(_) => "storage_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

pub use crate::api::ApiResult;
pub use crate::location::LocationResult;

/// Convenient Result alias for application-wide operations.
pub type FurryResult<T> = Result<T, FurryError>;

impl From<ApiError> for FurryError {
    fn from(err: ApiError) -> Self {
        Self::Api(err.user_message())
    }
}

impl<E: fmt::Display> From<RetryError<E>> for FurryError {
    fn from(err: RetryError<E>) -> Self {
        Self::Api(err.to_string())
    }
}

impl From<LocationError> for FurryError {
    fn from(err: LocationError) -> Self {
        Self::Location(err.to_string())
    }
}

//! Location sources that need no device hardware.
//!
//! These let the resolver run on a desktop or server, where the "device
//! position" is whatever the operator configured.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::traits::{LocationProvider, PermissionChecker};
use super::types::{
    Coordinate, LocationResult, LocationSubscription, Priority, SubscriptionId, UpdateRequest,
};

/// Permission checker with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission(pub bool);

impl StaticPermission {
    pub fn granted() -> Self {
        Self(true)
    }

    pub fn denied() -> Self {
        Self(false)
    }
}

impl PermissionChecker for StaticPermission {
    fn has_coarse_location(&self) -> bool {
        self.0
    }
}

/// Location provider backed by a coordinate from configuration.
///
/// The configured coordinate is served as the cached fix. Fresh fixes and
/// subscriptions never produce anything, so with no coordinate configured
/// every stage of the fallback chain is exercised and fails softly.
#[derive(Debug, Default)]
pub struct ConfiguredLocationProvider {
    fix: Option<Coordinate>,
    next_id: AtomicU64,
}

impl ConfiguredLocationProvider {
    pub fn new(fix: Option<Coordinate>) -> Self {
        Self {
            fix,
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocationProvider {
    async fn last_location(&self) -> LocationResult<Option<Coordinate>> {
        Ok(self.fix)
    }

    async fn current_location(
        &self,
        _priority: Priority,
        _cancel: CancellationToken,
    ) -> LocationResult<Option<Coordinate>> {
        Ok(None)
    }

    fn request_updates(&self, _request: UpdateRequest) -> LocationResult<LocationSubscription> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        // No sender is kept, so the stream ends immediately.
        let (_, updates) = mpsc::channel(1);
        log::debug!("[ConfiguredLocation] Opened empty subscription {}", id);
        Ok(LocationSubscription { id, updates })
    }

    fn remove_updates(&self, id: SubscriptionId) {
        log::debug!("[ConfiguredLocation] Removed subscription {}", id);
    }
}

//! Scoped ownership of an active location subscription.

use super::traits::LocationProvider;
use super::types::SubscriptionId;

/// Removes a location subscription exactly once.
///
/// The subscription is removed on the first of: an explicit
/// [`release`](Self::release), or the guard being dropped. Dropping covers
/// the paths where the enclosing future is cancelled mid-await.
pub(crate) struct SubscriptionGuard<'a> {
    provider: &'a dyn LocationProvider,
    id: Option<SubscriptionId>,
}

impl<'a> SubscriptionGuard<'a> {
    pub(crate) fn new(provider: &'a dyn LocationProvider, id: SubscriptionId) -> Self {
        Self {
            provider,
            id: Some(id),
        }
    }

    /// Removes the subscription now. Later calls (and the drop) are no-ops.
    pub(crate) fn release(&mut self) {
        if let Some(id) = self.id.take() {
            log::debug!("[Resolver] Removing location updates {}", id);
            self.provider.remove_updates(id);
        }
    }
}

impl Drop for SubscriptionGuard<'_> {
    fn drop(&mut self) {
        if self.id.is_some() {
            log::debug!("[Resolver] Subscription dropped while open, tearing down");
        }
        self.release();
    }
}

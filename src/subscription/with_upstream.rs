use super::{CancelFlag, Subscription, SubscriptionHandle};

/// A subscription owning exactly one upstream child.
///
/// Cancelling it cancels the child. Operators with a single dependency
/// (`contains`, `default_if_empty`, `do_on_event`, ...) use this shape.
pub struct WithUpstreamSubscription {
    flag: CancelFlag,
    upstream: SubscriptionHandle,
}

impl WithUpstreamSubscription {
    /// Wraps the subscription of the upstream computation.
    pub fn new(upstream: SubscriptionHandle) -> Self {
        Self {
            flag: CancelFlag::new(),
            upstream,
        }
    }

    /// The upstream subscription this one forwards to.
    pub const fn upstream(&self) -> &SubscriptionHandle {
        &self.upstream
    }

    pub(crate) const fn flag(&self) -> &CancelFlag {
        &self.flag
    }
}

impl Subscription for WithUpstreamSubscription {
    fn cancel(&self) {
        if self.flag.set() {
            self.upstream.cancel();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.flag.is_set()
    }
}

impl std::fmt::Debug for WithUpstreamSubscription {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("WithUpstreamSubscription")
            .field("cancelled", &self.is_cancelled())
            .field("upstream_cancelled", &self.upstream.is_cancelled())
            .finish()
    }
}

use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::{CancelFlag, Subscription, SubscriptionHandle};

/// A subscription owning a dynamic set of child subscriptions.
///
/// Operators that move from one upstream to the next (retries,
/// `switch_if_empty`, `flatten`) register the active child here and
/// [`remove`](Self::remove) it once they stop depending on it.
///
/// Adding a child to an already-cancelled composite cancels the child
/// instead of registering it.
#[derive(Default)]
pub struct CompositeSubscription {
    flag: CancelFlag,
    children: Mutex<SmallVec<[SubscriptionHandle; 2]>>,
}

impl CompositeSubscription {
    /// Creates an uncancelled composite with no children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `child`, or cancels it if this composite is already cancelled.
    pub fn add(&self, child: SubscriptionHandle) {
        let mut children = self.children.lock();
        if self.flag.is_set() {
            drop(children);
            child.cancel();
        } else {
            children.push(child);
        }
    }

    /// Deregisters `child` without cancelling it.
    ///
    /// Returns `false` if `child` was not registered.
    pub fn remove(&self, child: &SubscriptionHandle) -> bool {
        let mut children = self.children.lock();
        let before = children.len();
        children.retain(|registered| !Arc::ptr_eq(registered, child));
        children.len() != before
    }

    /// Number of registered children.
    pub fn len(&self) -> usize {
        self.children.lock().len()
    }

    /// Returns `true` if no child is registered.
    pub fn is_empty(&self) -> bool {
        self.children.lock().is_empty()
    }

    pub(crate) const fn flag(&self) -> &CancelFlag {
        &self.flag
    }
}

impl Subscription for CompositeSubscription {
    fn cancel(&self) {
        if !self.flag.set() {
            return;
        }
        let children = std::mem::take(&mut *self.children.lock());
        tracing::debug!(children = children.len(), "composite subscription cancelled");
        for child in children {
            child.cancel();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.flag.is_set()
    }
}

impl std::fmt::Debug for CompositeSubscription {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CompositeSubscription")
            .field("cancelled", &self.is_cancelled())
            .field("children", &self.len())
            .finish()
    }
}

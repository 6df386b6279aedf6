use parking_lot::Mutex;
use smallvec::SmallVec;

use super::{CancelFlag, Subscription};

type Listener = Box<dyn FnOnce() + Send>;

/// Identifies a listener registered on a [`WithCallbacksSubscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: SmallVec<[(ListenerId, Listener); 2]>,
}

/// A subscription that runs cleanup listeners when cancelled.
///
/// Listeners fire once, in registration order, on the first
/// [`cancel`](Subscription::cancel). Used where cancelling must run custom
/// cleanup (disarming a timer, say) rather than cancel an owned child.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use lazy_future::subscription::{Subscription, WithCallbacksSubscription};
///
/// let fired = Arc::new(AtomicUsize::new(0));
/// let subscription = WithCallbacksSubscription::new();
///
/// let counter = Arc::clone(&fired);
/// subscription.add_listener(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// subscription.cancel();
/// subscription.cancel();
/// assert_eq!(fired.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct WithCallbacksSubscription {
    flag: CancelFlag,
    listeners: Mutex<Listeners>,
}

impl WithCallbacksSubscription {
    /// Creates an uncancelled subscription with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener to run on cancellation.
    ///
    /// If the subscription is already cancelled the listener runs right away
    /// and is not stored.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnOnce() + Send + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        if self.flag.is_set() {
            drop(listeners);
            listener();
        } else {
            listeners.entries.push((id, Box::new(listener)));
        }
        id
    }

    /// Deregisters a listener without running it.
    ///
    /// Returns `false` if the listener already ran or was never registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    /// Number of listeners still waiting to run.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }

    pub(crate) const fn flag(&self) -> &CancelFlag {
        &self.flag
    }
}

impl Subscription for WithCallbacksSubscription {
    fn cancel(&self) {
        if !self.flag.set() {
            return;
        }
        let entries = std::mem::take(&mut self.listeners.lock().entries);
        for (_, listener) in entries {
            listener();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.flag.is_set()
    }
}

impl std::fmt::Debug for WithCallbacksSubscription {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("WithCallbacksSubscription")
            .field("cancelled", &self.is_cancelled())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<usize>>>, impl Fn(usize) -> Box<dyn FnOnce() + Send>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |index: usize| -> Box<dyn FnOnce() + Send> {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().push(index))
        };
        (log, make)
    }

    #[rstest]
    fn test_listeners_fire_in_order_once() {
        let (log, make) = recorder();
        let subscription = WithCallbacksSubscription::new();
        subscription.add_listener(make(1));
        subscription.add_listener(make(2));
        subscription.add_listener(make(3));

        subscription.cancel();
        subscription.cancel();

        assert_eq!(*log.lock(), vec![1, 2, 3]);
        assert_eq!(subscription.listener_count(), 0);
        assert!(subscription.is_cancelled());
    }

    #[rstest]
    fn test_removed_listener_never_fires() {
        let (log, make) = recorder();
        let subscription = WithCallbacksSubscription::new();
        let first = subscription.add_listener(make(1));
        subscription.add_listener(make(2));

        assert!(subscription.remove_listener(first));
        assert!(!subscription.remove_listener(first));
        subscription.cancel();

        assert_eq!(*log.lock(), vec![2]);
    }

    #[rstest]
    fn test_listener_added_after_cancel_fires_immediately() {
        let (log, make) = recorder();
        let subscription = WithCallbacksSubscription::new();
        subscription.cancel();

        subscription.add_listener(make(9));

        assert_eq!(*log.lock(), vec![9]);
        assert_eq!(subscription.listener_count(), 0);
    }
}

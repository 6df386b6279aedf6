//! Cancellation tokens for computations.
//!
//! Every [`Computation`](crate::Computation) carries exactly one
//! [`Subscription`]. Cancelling it is idempotent and safe at any point in the
//! computation's lifecycle; once `is_cancelled()` reports `true` it never
//! goes back, and no settle of the computation is delivered afterwards.
//!
//! Five shapes cover every operator:
//!
//! | Type | Holds | `cancel()` |
//! |---|---|---|
//! | [`EmptySubscription`] | nothing | no-op, never cancelled |
//! | [`BooleanSubscription`] | a flag | sets the flag |
//! | [`WithCallbacksSubscription`] | ordered listeners | sets the flag, fires each listener once |
//! | [`WithUpstreamSubscription`] | one child | sets the flag, cancels the child |
//! | [`CompositeSubscription`] | a registry of children | sets the flag, cancels every child |
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use lazy_future::subscription::{BooleanSubscription, CompositeSubscription, Subscription};
//!
//! let composite = CompositeSubscription::new();
//! let child: Arc<dyn Subscription> = Arc::new(BooleanSubscription::new());
//!
//! composite.add(Arc::clone(&child));
//! composite.cancel();
//!
//! assert!(composite.is_cancelled());
//! assert!(child.is_cancelled());
//! ```

mod boolean;
mod composite;
mod empty;
mod with_callbacks;
mod with_upstream;

pub use boolean::BooleanSubscription;
pub use composite::CompositeSubscription;
pub use empty::EmptySubscription;
pub use with_callbacks::{ListenerId, WithCallbacksSubscription};
pub use with_upstream::WithUpstreamSubscription;

use std::future::Future as StdFuture;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// An idempotent cancellation capability.
///
/// Implementations must be safe to cancel from any thread, any number of
/// times, before or after the guarded work has started.
pub trait Subscription: Send + Sync {
    /// Requests cancellation. Calls after the first have no effect.
    fn cancel(&self);

    /// Returns `true` once [`cancel`](Self::cancel) has taken effect.
    fn is_cancelled(&self) -> bool;
}

/// Shared handle to a type-erased subscription.
pub type SubscriptionHandle = std::sync::Arc<dyn Subscription>;

// =============================================================================
// Cancel Flag
// =============================================================================

/// Monotone cancellation flag that can also be awaited.
///
/// Driver tasks race their upstream against [`CancelFlag::until`] so they exit
/// as soon as the owning subscription is cancelled.
#[derive(Debug, Default)]
pub(crate) struct CancelFlag {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelFlag {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn is_set(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Sets the flag. Returns `true` only for the call that flipped it.
    pub(crate) fn set(&self) -> bool {
        let first = !self.cancelled.swap(true, Ordering::AcqRel);
        if first {
            self.notify.notify_waiters();
        }
        first
    }

    /// Completes once the flag is set.
    pub(crate) async fn wait(&self) {
        // Registration happens when `notified()` is created, so a `set`
        // between the check and the await is not lost.
        let notified = self.notify.notified();
        if self.is_set() {
            return;
        }
        notified.await;
    }

    /// Drives `work` to completion unless the flag is set first.
    pub(crate) async fn until<F>(&self, work: F) -> Option<F::Output>
    where
        F: StdFuture,
    {
        tokio::select! {
            biased;
            () = self.wait() => None,
            output = work => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    fn test_flag_set_reports_first_call_only() {
        let flag = CancelFlag::new();
        assert!(!flag.is_set());
        assert!(flag.set());
        assert!(!flag.set());
        assert!(flag.is_set());
    }

    #[rstest]
    #[tokio::test]
    async fn test_wait_returns_immediately_when_already_set() {
        let flag = CancelFlag::new();
        flag.set();
        flag.wait().await;
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_until_stops_on_cancel() {
        let flag = std::sync::Arc::new(CancelFlag::new());
        let cancelling = std::sync::Arc::clone(&flag);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancelling.set();
        });

        let output = flag
            .until(tokio::time::sleep(Duration::from_secs(60)))
            .await;

        assert!(output.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_until_returns_work_output() {
        let flag = CancelFlag::new();
        assert_eq!(flag.until(async { 7 }).await, Some(7));
    }
}

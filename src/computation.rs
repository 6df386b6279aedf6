//! One in-flight invocation of a [`Future`](crate::Future).
//!
//! A [`Computation`] pairs a result that settles at most once with the
//! [`Subscription`](crate::subscription::Subscription) that can cancel it. It
//! is produced together with a [`Settler`], the write half, by
//! [`Computation::pending`].
//!
//! Awaiting a `Computation` observes its single settle. A computation that is
//! cancelled before it settles never completes: the settler checks the
//! subscription immediately before delivering and drops the outcome instead.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use lazy_future::Computation;
//! use lazy_future::subscription::BooleanSubscription;
//!
//! # tokio_test_block_on(async {
//! let (settler, computation) = Computation::pending(Arc::new(BooleanSubscription::new()));
//! assert!(settler.resolve(42));
//! assert_eq!(computation.await.ok(), Some(42));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(future: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
//! # }
//! ```

use std::future::Future as StdFuture;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{FutureError, Outcome};
use crate::subscription::{EmptySubscription, SubscriptionHandle};

// =============================================================================
// Computation
// =============================================================================

/// A settling result plus the subscription that can cancel it.
///
/// Owned exclusively by whoever called [`Future::get`](crate::Future::get).
#[must_use = "a computation does nothing observable unless awaited or cancelled"]
pub struct Computation<T> {
    /// `None` once the settler was dropped without delivering.
    result: Option<oneshot::Receiver<Outcome<T>>>,
    subscription: SubscriptionHandle,
}

impl<T> Computation<T> {
    /// Creates an unsettled computation and the settler that completes it.
    ///
    /// Deliveries through the settler are gated on `subscription`.
    pub fn pending(subscription: SubscriptionHandle) -> (Settler<T>, Self) {
        let (sender, result) = oneshot::channel();
        let settler = Settler {
            sender,
            gate: SubscriptionHandle::clone(&subscription),
        };
        (
            settler,
            Self {
                result: Some(result),
                subscription,
            },
        )
    }

    /// Creates a computation that has already settled with `outcome`.
    ///
    /// Its subscription is an [`EmptySubscription`]: there is nothing left
    /// to cancel.
    pub fn settled(outcome: Outcome<T>) -> Self {
        let (settler, computation) = Self::pending(std::sync::Arc::new(EmptySubscription));
        settler.settle(outcome);
        computation
    }

    /// Returns a shared handle to this computation's subscription.
    #[must_use]
    pub fn subscription(&self) -> SubscriptionHandle {
        SubscriptionHandle::clone(&self.subscription)
    }

    /// Cancels this computation.
    pub fn cancel(&self) {
        self.subscription.cancel();
    }

    /// Returns `true` once this computation has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.subscription.is_cancelled()
    }
}

impl<T> StdFuture for Computation<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(result) = this.result.as_mut() else {
            return Poll::Pending;
        };
        match Pin::new(result).poll(context) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // The settler was dropped without delivering: the computation was
            // cancelled and will never settle. The receiver is spent and must
            // not be polled again.
            Poll::Ready(Err(_)) => {
                this.result = None;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> std::fmt::Debug for Computation<T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Computation")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Settler
// =============================================================================

/// The write half of a [`Computation`].
///
/// Every method consumes the settler, so a computation settles at most once.
/// Each returns `true` if the outcome reached the computation, and `false`
/// if delivery was suppressed because the subscription had been cancelled
/// (or the computation was dropped).
pub struct Settler<T> {
    sender: oneshot::Sender<Outcome<T>>,
    gate: SubscriptionHandle,
}

impl<T> Settler<T> {
    /// Delivers `outcome` unless the computation was cancelled.
    pub fn settle(self, outcome: Outcome<T>) -> bool {
        if self.gate.is_cancelled() {
            return false;
        }
        self.sender.send(outcome).is_ok()
    }

    /// Resolves with `value`.
    pub fn resolve(self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Rejects with `error`.
    pub fn reject(self, error: FutureError) -> bool {
        self.settle(Err(error))
    }

    /// Returns `true` if delivery would currently be suppressed.
    pub fn is_cancelled(&self) -> bool {
        self.gate.is_cancelled()
    }
}

impl<T> std::fmt::Debug for Settler<T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Settler")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

//! The lazy, re-invokable [`Future`] descriptor.
//!
//! A `Future<T>` describes deferred work that eventually produces one `T` or
//! one [`FutureError`]. Building a `Future` does nothing; every call to
//! [`Future::get`] starts an independent [`Computation`]. Nothing is memoized
//! or shared between invocations.
//!
//! Pipelines are assembled left to right with [`Future::compose`] and the
//! transformers in [`operators`](crate::operators):
//!
//! ```rust
//! use lazy_future::{Future, FutureError};
//! use lazy_future::operators::{contains, default_if_empty, retry_counted};
//! use lazy_future::runtime::block_on;
//!
//! let lookup = Future::<Option<i32>>::success(None)
//!     .compose(default_if_empty(5))
//!     .compose(retry_counted(3))
//!     .compose(contains(5));
//!
//! assert_eq!(block_on(lookup.get()).ok(), Some(true));
//! ```

use std::fmt;
use std::future::Future as StdFuture;
use std::sync::Arc;

use crate::computation::Computation;
use crate::error::{FutureError, Outcome};
use crate::runtime;
use crate::subscription::BooleanSubscription;

// =============================================================================
// Future
// =============================================================================

/// A lazy descriptor of a single eventual value or failure.
///
/// Cloning a `Future` is cheap and yields the same descriptor.
pub struct Future<T> {
    get: Arc<dyn Fn() -> Computation<T> + Send + Sync>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
        }
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Future").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Future<T> {
    /// Creates a `Future` from the function that starts one invocation.
    ///
    /// `get` must return synchronously; the work it starts may settle later.
    pub fn new<F>(get: F) -> Self
    where
        F: Fn() -> Computation<T> + Send + Sync + 'static,
    {
        Self { get: Arc::new(get) }
    }

    /// Starts a new, independent invocation.
    pub fn get(&self) -> Computation<T> {
        (self.get)()
    }

    /// Applies `transformer` to this future.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazy_future::Future;
    /// use lazy_future::operators::map;
    /// use lazy_future::runtime::block_on;
    ///
    /// let doubled = Future::success(21).compose(map(|value: i32| value * 2));
    /// assert_eq!(block_on(doubled.get()).ok(), Some(42));
    /// ```
    pub fn compose<B, X>(self, transformer: X) -> Future<B>
    where
        X: Transformer<T, B>,
    {
        transformer.transform(self)
    }
}

// =============================================================================
// Leaves
// =============================================================================

impl<T: Clone + Send + Sync + 'static> Future<T> {
    /// A future that resolves every invocation with a clone of `value`.
    pub fn success(value: T) -> Self {
        Self::new(move || {
            let (settler, computation) = Computation::pending(Arc::new(BooleanSubscription::new()));
            settler.resolve(value.clone());
            computation
        })
    }
}

impl<T: Send + 'static> Future<T> {
    /// A future that rejects every invocation with `error`.
    pub fn failure(error: FutureError) -> Self {
        Self::new(move || {
            let (settler, computation) = Computation::pending(Arc::new(BooleanSubscription::new()));
            settler.reject(error.clone());
            computation
        })
    }

    /// A future whose invocations each run a fresh async block.
    ///
    /// `factory` is called synchronously by [`get`](Self::get); the async block
    /// it returns is driven on the current runtime. Cancelling the computation
    /// stops polling the block.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use lazy_future::Future;
    /// use lazy_future::runtime::block_on;
    ///
    /// let slow = Future::from_async(|| async {
    ///     tokio::time::sleep(Duration::from_millis(1)).await;
    ///     Ok::<_, lazy_future::FutureError>("done")
    /// });
    /// assert_eq!(block_on(slow.get()).ok(), Some("done"));
    /// ```
    pub fn from_async<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: StdFuture<Output = Outcome<T>> + Send + 'static,
    {
        Self::new(move || {
            let subscription = Arc::new(BooleanSubscription::new());
            let (settler, computation) = Computation::pending(subscription.clone());
            let work = factory();
            runtime::spawn(async move {
                if let Some(outcome) = subscription.flag().until(work).await {
                    settler.settle(outcome);
                }
            });
            computation
        })
    }
}

// =============================================================================
// Transformer
// =============================================================================

/// A function from one future to another, applied with [`Future::compose`].
///
/// Every `FnOnce(Future<A>) -> Future<B>` is a transformer.
pub trait Transformer<A, B> {
    /// Builds the transformed future.
    fn transform(self, future: Future<A>) -> Future<B>;
}

impl<A, B, F> Transformer<A, B> for F
where
    F: FnOnce(Future<A>) -> Future<B>,
{
    fn transform(self, future: Future<A>) -> Future<B> {
        self(future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[rstest]
    #[tokio::test]
    async fn test_success_resolves_every_invocation() {
        let future = Future::success("Hello");
        assert_eq!(future.get().await.ok(), Some("Hello"));
        assert_eq!(future.get().await.ok(), Some("Hello"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_failure_rejects_every_invocation() {
        let future = Future::<i32>::failure(FutureError::msg("Error"));
        for _ in 0..2 {
            assert_eq!(future.get().await.unwrap_err().to_string(), "Error");
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_from_async_runs_once_per_get() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let future = Future::from_async(move || {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, FutureError>(count) }
        });

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(future.get().await.ok(), Some(0));
        assert_eq!(future.get().await.ok(), Some(1));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_from_async_cancel_stops_work() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);
        let future = Future::from_async(move || {
            let counter = Arc::clone(&counter);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FutureError>(())
            }
        });

        let computation = future.get();
        computation.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert!(
            tokio::time::timeout(Duration::from_secs(1), computation)
                .await
                .is_err()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_compose_applies_closure() {
        let future = Future::success(1).compose(|upstream: Future<i32>| {
            Future::new(move || upstream.get())
        });
        assert_eq!(future.get().await.ok(), Some(1));
    }
}

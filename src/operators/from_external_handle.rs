use std::future::Future as StdFuture;
use std::sync::Arc;

use futures::FutureExt;

use crate::computation::Computation;
use crate::error::{FutureError, Outcome};
use crate::future::Future;
use crate::runtime;
use crate::subscription::BooleanSubscription;

/// Adapts an externally driven async handle into a [`Future`].
///
/// The handle is spawned once, when this is called, on the current runtime
/// (or the fallback runtime) and runs to completion independently of any
/// invocation. Every invocation observes the same eventual outcome.
/// Cancelling an invocation stops its wait and suppresses delivery to it;
/// the external work itself cannot be stopped from here.
///
/// # Examples
///
/// ```rust
/// use lazy_future::{Future, FutureError};
/// use lazy_future::operators::from_external_handle;
/// use lazy_future::runtime::block_on;
///
/// let future = from_external_handle(async { Ok::<_, FutureError>(42) });
/// assert_eq!(block_on(future.get()).ok(), Some(42));
/// assert_eq!(block_on(future.get()).ok(), Some(42));
/// ```
pub fn from_external_handle<T, H>(handle: H) -> Future<T>
where
    T: Clone + Send + Sync + 'static,
    H: StdFuture<Output = Outcome<T>> + Send + 'static,
{
    let handle = runtime::handle()
        .spawn(handle)
        .map(|joined| joined.unwrap_or_else(|error| Err(FutureError::new(error))))
        .shared();

    Future::new(move || {
        let subscription = Arc::new(BooleanSubscription::new());
        let (settler, computation) = Computation::pending(subscription.clone());
        let handle = handle.clone();

        runtime::spawn(async move {
            if let Some(outcome) = subscription.flag().until(handle).await {
                settler.settle(outcome);
            }
        });

        computation
    })
}

impl<T: Clone + Send + Sync + 'static> Future<T> {
    /// See [`from_external_handle`].
    pub fn from_external_handle<H>(handle: H) -> Self
    where
        H: StdFuture<Output = Outcome<T>> + Send + 'static,
    {
        from_external_handle(handle)
    }
}

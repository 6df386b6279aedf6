use std::sync::Arc;

use crate::computation::Computation;
use crate::error::{CompositeError, Outcome};
use crate::function::Finalizer;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{Subscription, WithUpstreamSubscription};

/// Calls `finally` once the upstream settles, whichever way it settles.
///
/// On success a callback failure replaces the value. On failure a callback
/// failure yields a [`CompositeError`] of `[original, callback]`.
///
/// # Examples
///
/// ```rust
/// use lazy_future::{Future, FutureError};
/// use lazy_future::operators::do_finally;
/// use lazy_future::runtime::block_on;
///
/// let future = Future::success("Hello").compose(do_finally(|| Err(FutureError::msg("Error"))));
/// assert_eq!(block_on(future.get()).unwrap_err().to_string(), "Error");
/// ```
pub fn do_finally<T, F>(finally: F) -> impl FnOnce(Future<T>) -> Future<T>
where
    T: Send + 'static,
    F: Fn() -> Outcome<()> + Send + Sync + 'static,
{
    let finally: Finalizer = Arc::new(finally);

    move |upstream: Future<T>| {
        Future::new(move || {
            let computation = upstream.get();
            let subscription =
                Arc::new(WithUpstreamSubscription::new(computation.subscription()));
            let (settler, downstream) = Computation::pending(subscription.clone());
            let finally = Arc::clone(&finally);

            runtime::spawn(async move {
                let Some(outcome) = subscription.flag().until(computation).await else {
                    return;
                };
                let outcome = match (outcome, finally()) {
                    (outcome, Ok(())) => outcome,
                    (Ok(_), Err(callback_error)) => Err(callback_error),
                    (Err(error), Err(callback_error)) => {
                        Err(CompositeError::new(error, callback_error).into())
                    }
                };
                let failed = outcome.is_err();
                settler.settle(outcome);
                if failed {
                    subscription.cancel();
                }
            });

            downstream
        })
    }
}

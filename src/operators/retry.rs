use std::sync::Arc;

use crate::computation::Computation;
use crate::future::Future;
use crate::runtime;
use crate::subscription::CompositeSubscription;

/// Retries the upstream on every failure until it succeeds.
///
/// There is no limit and no backoff: each failure immediately
/// releases the failed attempt from the composite subscription, cancels it
/// and invokes the upstream again. The loop ends only on success or when the
/// computation is cancelled.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use lazy_future::{Computation, Future, FutureError};
/// use lazy_future::operators::retry;
/// use lazy_future::runtime::block_on;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
/// let flaky = Future::new(move || {
///     let call = counter.fetch_add(1, Ordering::SeqCst);
///     Computation::settled(if call < 3 { Err(FutureError::msg("flaky")) } else { Ok(call) })
/// });
///
/// assert_eq!(block_on(flaky.compose(retry()).get()).ok(), Some(3));
/// ```
pub fn retry<T>() -> impl FnOnce(Future<T>) -> Future<T>
where
    T: Send + 'static,
{
    move |upstream: Future<T>| {
        Future::new(move || {
            let subscription = Arc::new(CompositeSubscription::new());
            let (settler, downstream) = Computation::pending(subscription.clone());

            let mut attempt = upstream.get();
            subscription.add(attempt.subscription());
            let upstream = upstream.clone();

            runtime::spawn(async move {
                let mut attempts: u64 = 1;
                loop {
                    let handle = attempt.subscription();
                    match subscription.flag().until(attempt).await {
                        None => return,
                        Some(Ok(value)) => {
                            settler.resolve(value);
                            return;
                        }
                        Some(Err(error)) => {
                            tracing::trace!(attempt = attempts, %error, "retrying failed attempt");
                            subscription.remove(&handle);
                            handle.cancel();
                            attempts += 1;
                            attempt = upstream.get();
                            subscription.add(attempt.subscription());
                        }
                    }
                }
            });

            downstream
        })
    }
}

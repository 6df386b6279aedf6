use std::sync::Arc;

use crate::computation::Computation;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{CompositeSubscription, Subscription};

/// Retries the upstream at most `count` times.
///
/// The upstream is attempted up to `count + 1` times in total. When the last
/// allowed attempt fails, the computation rejects with that attempt's error
/// (there is no separate "exhausted" error).
///
/// # Examples
///
/// ```rust
/// use lazy_future::{Future, FutureError};
/// use lazy_future::operators::retry_counted;
/// use lazy_future::runtime::block_on;
///
/// let future = Future::<()>::failure(FutureError::msg("Error")).compose(retry_counted(2));
/// assert_eq!(block_on(future.get()).unwrap_err().to_string(), "Error");
/// ```
pub fn retry_counted<T>(count: usize) -> impl FnOnce(Future<T>) -> Future<T>
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
                let mut retries: usize = 0;
                loop {
                    let handle = attempt.subscription();
                    match subscription.flag().until(attempt).await {
                        None => return,
                        Some(Ok(value)) => {
                            settler.resolve(value);
                            return;
                        }
                        Some(Err(error)) if retries >= count => {
                            tracing::debug!(limit = count, %error, "retries exhausted");
                            settler.reject(error);
                            subscription.cancel();
                            return;
                        }
                        Some(Err(error)) => {
                            retries += 1;
                            tracing::trace!(
                                attempt = retries + 1,
                                limit = count,
                                %error,
                                "retrying failed attempt"
                            );
                            subscription.remove(&handle);
                            handle.cancel();
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

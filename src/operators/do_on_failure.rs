use std::sync::Arc;

use crate::computation::Computation;
use crate::error::{CompositeError, FutureError, Outcome};
use crate::function::Consumer;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{Subscription, WithUpstreamSubscription};

/// Calls `on_failure` with the upstream error, then rejects.
///
/// Successes pass through without calling it. If the callback fails, the
/// computation rejects with a [`CompositeError`] of `[original, callback]`.
///
/// # Examples
///
/// ```rust
/// use lazy_future::{Future, FutureError};
/// use lazy_future::operators::do_on_failure;
/// use lazy_future::runtime::block_on;
///
/// let future = Future::<()>::failure(FutureError::msg("Error"))
///     .compose(do_on_failure(|_| Err(FutureError::msg("Error"))));
///
/// let error = block_on(future.get()).unwrap_err();
/// assert_eq!(error.to_string(), r#"["Error","Error"]"#);
/// ```
pub fn do_on_failure<T, F>(on_failure: F) -> impl FnOnce(Future<T>) -> Future<T>
where
    T: Send + 'static,
    F: Fn(&FutureError) -> Outcome<()> + Send + Sync + 'static,
{
    let on_failure: Consumer<FutureError> = Arc::new(on_failure);

    move |upstream: Future<T>| {
        Future::new(move || {
            let computation = upstream.get();
            let subscription =
                Arc::new(WithUpstreamSubscription::new(computation.subscription()));
            let (settler, downstream) = Computation::pending(subscription.clone());
            let on_failure = Arc::clone(&on_failure);

            runtime::spawn(async move {
                match subscription.flag().until(computation).await {
                    None => {}
                    Some(Ok(value)) => {
                        settler.resolve(value);
                    }
                    Some(Err(error)) => {
                        let reason = match on_failure(&error) {
                            Ok(()) => error,
                            Err(callback_error) => {
                                CompositeError::new(error, callback_error).into()
                            }
                        };
                        settler.reject(reason);
                        subscription.cancel();
                    }
                }
            });

            downstream
        })
    }
}

use std::sync::Arc;

use crate::computation::Computation;
use crate::error::{CompositeError, FutureError, Outcome};
use crate::function::Consumer2;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{Subscription, WithUpstreamSubscription};

/// Calls `on_event` exactly once with whichever side of the outcome is
/// present.
///
/// On success the callback receives `(Some(value), None)`; if it fails, its
/// error replaces the success. On failure it receives `(None, Some(error))`;
/// if it fails, the computation rejects with a
/// [`CompositeError`] of `[original, callback]`. Either way a callback
/// failure cancels the upstream.
///
/// The failure-side callback error does not supersede the upstream error:
/// both are kept, as in [`do_on_failure`](crate::operators::do_on_failure).
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use lazy_future::Future;
/// use lazy_future::operators::do_on_event;
/// use lazy_future::runtime::block_on;
///
/// let seen = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&seen);
/// let future = Future::success(1).compose(do_on_event(move |value: Option<&i32>, _| {
///     flag.store(value == Some(&1), Ordering::SeqCst);
///     Ok(())
/// }));
///
/// assert_eq!(block_on(future.get()).ok(), Some(1));
/// assert!(seen.load(Ordering::SeqCst));
/// ```
pub fn do_on_event<T, F>(on_event: F) -> impl FnOnce(Future<T>) -> Future<T>
where
    T: Send + 'static,
    F: Fn(Option<&T>, Option<&FutureError>) -> Outcome<()> + Send + Sync + 'static,
{
    let on_event: Consumer2<T, FutureError> = Arc::new(on_event);

    move |upstream: Future<T>| {
        Future::new(move || {
            let computation = upstream.get();
            let subscription =
                Arc::new(WithUpstreamSubscription::new(computation.subscription()));
            let (settler, downstream) = Computation::pending(subscription.clone());
            let on_event = Arc::clone(&on_event);

            runtime::spawn(async move {
                let Some(outcome) = subscription.flag().until(computation).await else {
                    return;
                };
                match outcome {
                    Ok(value) => match on_event(Some(&value), None) {
                        Ok(()) => {
                            settler.resolve(value);
                        }
                        Err(callback_error) => {
                            settler.reject(callback_error);
                            subscription.cancel();
                        }
                    },
                    Err(error) => {
                        let reason = match on_event(None, Some(&error)) {
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

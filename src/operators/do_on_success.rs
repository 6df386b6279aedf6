use std::sync::Arc;

use crate::computation::Computation;
use crate::error::Outcome;
use crate::function::Consumer;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{Subscription, WithUpstreamSubscription};

/// Calls `on_success` with the resolved value before passing it on.
///
/// Failures pass through untouched. If the callback fails, its error
/// replaces the success and the upstream is cancelled.
pub fn do_on_success<T, F>(on_success: F) -> impl FnOnce(Future<T>) -> Future<T>
where
    T: Send + 'static,
    F: Fn(&T) -> Outcome<()> + Send + Sync + 'static,
{
    let on_success: Consumer<T> = Arc::new(on_success);

    move |upstream: Future<T>| {
        Future::new(move || {
            let computation = upstream.get();
            let subscription =
                Arc::new(WithUpstreamSubscription::new(computation.subscription()));
            let (settler, downstream) = Computation::pending(subscription.clone());
            let on_success = Arc::clone(&on_success);

            runtime::spawn(async move {
                let Some(outcome) = subscription.flag().until(computation).await else {
                    return;
                };
                let outcome = outcome.and_then(|value| on_success(&value).map(|()| value));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FutureError;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[tokio::test]
    async fn test_observes_value() {
        let seen = Arc::new(AtomicI32::new(0));
        let sink = Arc::clone(&seen);
        let future = Future::success(8).compose(do_on_success(move |value: &i32| {
            sink.store(*value, Ordering::SeqCst);
            Ok(())
        }));

        assert_eq!(future.get().await.ok(), Some(8));
        assert_eq!(seen.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_failing_callback_replaces_value() {
        let future = Future::success(8)
            .compose(do_on_success(|_: &i32| Err(FutureError::msg("rejected"))));
        assert_eq!(future.get().await.unwrap_err().to_string(), "rejected");
    }

    #[tokio::test]
    async fn test_failure_skips_callback() {
        let future = Future::<i32>::failure(FutureError::msg("Error"))
            .compose(do_on_success(|_: &i32| Err(FutureError::msg("unreachable"))));
        assert_eq!(future.get().await.unwrap_err().to_string(), "Error");
    }
}

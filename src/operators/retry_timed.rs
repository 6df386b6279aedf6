use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::computation::Computation;
use crate::error::FutureError;
use crate::function::Predicate;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{Subscription, WithCallbacksSubscription};

/// Retries the upstream until `time` has elapsed.
///
/// `time` is a single deadline for the whole retry loop, not a per-attempt
/// timeout. A timer armed on [`Future::get`] marks the loop as expired; an
/// attempt that fails after expiry rejects with its error instead of
/// retrying, even if it was started before the deadline. The timer is
/// disarmed when the computation is cancelled.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use lazy_future::{Future, FutureError};
/// use lazy_future::operators::retry_timed;
/// use lazy_future::runtime::block_on;
///
/// let slow_failure = Future::<()>::from_async(|| async {
///     tokio::time::sleep(Duration::from_millis(5)).await;
///     Err::<(), _>(FutureError::msg("Error"))
/// });
/// let future = slow_failure.compose(retry_timed(Duration::from_millis(20)));
/// assert_eq!(block_on(future.get()).unwrap_err().to_string(), "Error");
/// ```
pub fn retry_timed<T>(time: Duration) -> impl FnOnce(Future<T>) -> Future<T>
where
    T: Send + 'static,
{
    move |upstream: Future<T>| retry_timed_by(upstream, time, None)
}

/// Like [`retry_timed`], but also stops as soon as `until(error)` is `true`.
///
/// Expiry is checked first: once the deadline has passed, `until` is not
/// consulted.
pub fn retry_timed_until<T, P>(time: Duration, until: P) -> impl FnOnce(Future<T>) -> Future<T>
where
    T: Send + 'static,
    P: Fn(&FutureError) -> bool + Send + Sync + 'static,
{
    move |upstream: Future<T>| retry_timed_by(upstream, time, Some(Arc::new(until)))
}

fn retry_timed_by<T>(
    upstream: Future<T>,
    time: Duration,
    until: Option<Predicate<FutureError>>,
) -> Future<T>
where
    T: Send + 'static,
{
    Future::new(move || {
        let subscription = Arc::new(WithCallbacksSubscription::new());
        let (settler, downstream) = Computation::pending(subscription.clone());

        let expired = Arc::new(AtomicBool::new(false));
        let timer = {
            let expired = Arc::clone(&expired);
            runtime::spawn(async move {
                tokio::time::sleep(time).await;
                expired.store(true, Ordering::Release);
            })
        };
        let disarm = timer.abort_handle();
        subscription.add_listener(move || disarm.abort());

        let mut attempt = upstream.get();
        let mut listener = {
            let handle = attempt.subscription();
            subscription.add_listener(move || handle.cancel())
        };
        let upstream = upstream.clone();
        let until = until.clone();

        runtime::spawn(async move {
            let mut attempts: u64 = 1;
            loop {
                let handle = attempt.subscription();
                let error = match subscription.flag().until(attempt).await {
                    None => return,
                    Some(Ok(value)) => {
                        timer.abort();
                        subscription.remove_listener(listener);
                        settler.resolve(value);
                        return;
                    }
                    Some(Err(error)) => error,
                };

                if expired.load(Ordering::Acquire) {
                    tracing::debug!(attempts, %error, "retry deadline expired");
                    settler.reject(error);
                    subscription.cancel();
                    return;
                }
                if until.as_ref().is_some_and(|until| until(&error)) {
                    tracing::debug!(attempts, %error, "retry stopped by predicate");
                    settler.reject(error);
                    subscription.cancel();
                    return;
                }

                tracing::trace!(attempt = attempts, %error, "retrying failed attempt");
                subscription.remove_listener(listener);
                handle.cancel();
                attempts += 1;
                attempt = upstream.get();
                let next = attempt.subscription();
                listener = subscription.add_listener(move || next.cancel());
            }
        });

        downstream
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::AtomicUsize;

    fn failing_after(delay: Duration, calls: &Arc<AtomicUsize>) -> Future<()> {
        let calls = Arc::clone(calls);
        Future::from_async(move || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                tokio::time::sleep(delay).await;
                Err::<(), _>(FutureError::msg(format!("failure {call}")))
            }
        })
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_rejects_once_deadline_passes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let future = failing_after(Duration::from_millis(30), &calls)
            .compose(retry_timed(Duration::from_millis(100)));

        let started = tokio::time::Instant::now();
        let error = future.get().await.unwrap_err();

        // Attempts start at 0, 30, 60 and 90ms; the one started at 90ms fails
        // at 120ms, after the deadline, and is not retried.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(error.to_string(), "failure 4");
        assert!(started.elapsed() >= Duration::from_millis(120));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_until_stops_early() {
        let calls = Arc::new(AtomicUsize::new(0));
        let future = failing_after(Duration::from_millis(10), &calls).compose(retry_timed_until(
            Duration::from_secs(60),
            |error: &FutureError| error.to_string() == "failure 2",
        ));

        assert_eq!(future.get().await.unwrap_err().to_string(), "failure 2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_expiry_wins_over_until() {
        let consulted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&consulted);
        let calls = Arc::new(AtomicUsize::new(0));
        let future = failing_after(Duration::from_millis(50), &calls).compose(retry_timed_until(
            Duration::from_millis(10),
            move |_: &FutureError| {
                flag.store(true, Ordering::SeqCst);
                false
            },
        ));

        assert_eq!(future.get().await.unwrap_err().to_string(), "failure 1");
        assert!(!consulted.load(Ordering::SeqCst));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_success_before_deadline() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let flaky = Future::from_async(move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                if call < 2 {
                    Err(FutureError::msg("flaky"))
                } else {
                    Ok(call)
                }
            }
        });

        let future = flaky.compose(retry_timed(Duration::from_millis(100)));
        assert_eq!(future.get().await.ok(), Some(2));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_cancel_disarms_timer_and_stops_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let computation = failing_after(Duration::from_millis(10), &calls)
            .compose(retry_timed(Duration::from_millis(1000)))
            .get();

        tokio::time::sleep(Duration::from_millis(25)).await;
        computation.cancel();
        let attempts_at_cancel = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(attempts_at_cancel, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(
            tokio::time::timeout(Duration::from_secs(5), computation)
                .await
                .is_err()
        );
    }
}

use std::sync::Arc;

use crate::computation::Computation;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{CompositeSubscription, Subscription};

/// Switches to `other` when the upstream resolves empty (`None`).
///
/// On an empty value the upstream registration is released and `other` is
/// invoked; its outcome, success or failure, becomes this computation's
/// outcome. A present value resolves directly and `other` is never invoked.
///
/// At most one child is registered at a time, so cancelling after the
/// switch cancels only `other`'s computation.
///
/// # Examples
///
/// ```rust
/// use lazy_future::Future;
/// use lazy_future::operators::switch_if_empty;
/// use lazy_future::runtime::block_on;
///
/// let fallback = Future::success(Some("cached"));
/// let future = Future::<Option<&str>>::success(None).compose(switch_if_empty(fallback));
/// assert_eq!(block_on(future.get()).ok(), Some(Some("cached")));
/// ```
pub fn switch_if_empty<T>(
    other: Future<Option<T>>,
) -> impl FnOnce(Future<Option<T>>) -> Future<Option<T>>
where
    T: Send + 'static,
{
    move |upstream: Future<Option<T>>| {
        Future::new(move || {
            let subscription = Arc::new(CompositeSubscription::new());
            let (settler, downstream) = Computation::pending(subscription.clone());

            let primary = upstream.get();
            let primary_handle = primary.subscription();
            subscription.add(primary_handle.clone());
            let other = other.clone();

            runtime::spawn(async move {
                let outcome = match subscription.flag().until(primary).await {
                    None => return,
                    Some(Ok(None)) => {
                        subscription.remove(&primary_handle);
                        let switched = other.get();
                        subscription.add(switched.subscription());
                        match subscription.flag().until(switched).await {
                            None => return,
                            Some(outcome) => outcome,
                        }
                    }
                    Some(outcome) => outcome,
                };
                match outcome {
                    Ok(value) => {
                        settler.resolve(value);
                    }
                    Err(error) => {
                        settler.reject(error);
                        subscription.cancel();
                    }
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
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::subscription::SubscriptionHandle;

    type Slot = Arc<parking_lot::Mutex<Option<SubscriptionHandle>>>;

    fn recording(future: Future<Option<i32>>, slot: Slot) -> Future<Option<i32>> {
        Future::new(move || {
            let computation = future.get();
            *slot.lock() = Some(computation.subscription());
            computation
        })
    }

    fn delayed(value: Option<i32>, delay: Duration) -> Future<Option<i32>> {
        Future::from_async(move || async move {
            tokio::time::sleep(delay).await;
            Ok::<_, FutureError>(value)
        })
    }

    fn counted(value: Option<i32>, calls: &Arc<AtomicUsize>) -> Future<Option<i32>> {
        let calls = Arc::clone(calls);
        Future::from_async(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, FutureError>(value) }
        })
    }

    #[rstest]
    #[tokio::test]
    async fn test_empty_primary_adopts_other_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let future = Future::success(None).compose(switch_if_empty(counted(Some(7), &calls)));

        assert_eq!(future.get().await.ok(), Some(Some(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_empty_primary_adopts_other_failure() {
        let future = Future::<Option<i32>>::success(None)
            .compose(switch_if_empty(Future::failure(FutureError::msg("other failed"))));

        assert_eq!(future.get().await.unwrap_err().to_string(), "other failed");
    }

    #[rstest]
    #[tokio::test]
    async fn test_present_primary_never_invokes_other() {
        let calls = Arc::new(AtomicUsize::new(0));
        let future = Future::success(Some(1)).compose(switch_if_empty(counted(Some(7), &calls)));

        assert_eq!(future.get().await.ok(), Some(Some(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_primary_failure_never_invokes_other() {
        let calls = Arc::new(AtomicUsize::new(0));
        let future = Future::<Option<i32>>::failure(FutureError::msg("Error"))
            .compose(switch_if_empty(counted(Some(7), &calls)));

        assert_eq!(future.get().await.unwrap_err().to_string(), "Error");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_switch_suppresses_other() {
        let other = Future::from_async(|| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, FutureError>(Some(9))
        });
        let computation = Future::<Option<i32>>::success(None)
            .compose(switch_if_empty(other))
            .get();

        tokio::time::sleep(Duration::from_millis(10)).await;
        computation.cancel();

        assert!(
            tokio::time::timeout(Duration::from_secs(1), computation)
                .await
                .is_err()
        );
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_switch_cancels_only_other() {
        let primary_slot = Slot::default();
        let other_slot = Slot::default();
        let primary = recording(
            delayed(None, Duration::from_millis(5)),
            Arc::clone(&primary_slot),
        );
        let other = recording(
            delayed(Some(9), Duration::from_millis(100)),
            Arc::clone(&other_slot),
        );

        let computation = primary.compose(switch_if_empty(other)).get();
        tokio::time::sleep(Duration::from_millis(20)).await;
        computation.cancel();

        let primary = primary_slot.lock().clone().unwrap();
        let other = other_slot.lock().clone().unwrap();
        assert!(!primary.is_cancelled());
        assert!(other.is_cancelled());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_switch_cancels_primary() {
        let primary_slot = Slot::default();
        let other_slot = Slot::default();
        let primary = recording(
            delayed(None, Duration::from_millis(50)),
            Arc::clone(&primary_slot),
        );
        let other = recording(
            delayed(Some(9), Duration::from_millis(5)),
            Arc::clone(&other_slot),
        );

        let computation = primary.compose(switch_if_empty(other)).get();
        computation.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(primary_slot.lock().clone().unwrap().is_cancelled());
        assert!(other_slot.lock().is_none());
    }
}

use std::sync::Arc;

use parking_lot::Mutex;

use crate::computation::Computation;
use crate::error::Outcome;
use crate::function::Supplier;
use crate::future::Future;
use crate::runtime;
use crate::scheduler::Scheduler;
use crate::subscription::{Subscription, WithUpstreamSubscription};

/// A future that runs `supplier` through `scheduler` on every invocation.
///
/// With an [`ImmediateScheduler`](crate::scheduler::ImmediateScheduler) the
/// supplier runs inside [`Future::get`]; with a
/// [`DelayedScheduler`](crate::scheduler::DelayedScheduler) it runs after the
/// delay, and cancelling first means it never runs.
///
/// # Examples
///
/// ```rust
/// use lazy_future::operators::from_supplier;
/// use lazy_future::scheduler::ImmediateScheduler;
/// use lazy_future::runtime::block_on;
///
/// let future = from_supplier(ImmediateScheduler, || Ok(6 * 7));
/// assert_eq!(block_on(future.get()).ok(), Some(42));
/// ```
pub fn from_supplier<T, S, F>(scheduler: S, supplier: F) -> Future<T>
where
    T: Send + 'static,
    S: Scheduler + 'static,
    F: Fn() -> Outcome<T> + Send + Sync + 'static,
{
    let supplier: Supplier<T> = Arc::new(supplier);

    Future::new(move || {
        let slot = Arc::new(Mutex::new(None));
        let supplied = Arc::clone(&slot);
        let supplier = Arc::clone(&supplier);
        let scheduled = scheduler.schedule(Box::new(move || -> Outcome<()> {
            let value = supplier()?;
            *supplied.lock() = Some(value);
            Ok(())
        }));

        let subscription = Arc::new(WithUpstreamSubscription::new(scheduled.subscription()));
        let (settler, computation) = Computation::pending(subscription.clone());

        runtime::spawn(async move {
            match subscription.flag().until(scheduled).await {
                None => {}
                Some(Ok(())) => {
                    if let Some(value) = slot.lock().take() {
                        settler.resolve(value);
                    }
                }
                Some(Err(error)) => {
                    settler.reject(error);
                    subscription.cancel();
                }
            }
        });

        computation
    })
}

impl<T: Send + 'static> Future<T> {
    /// See [`from_supplier`].
    pub fn from_supplier<S, F>(scheduler: S, supplier: F) -> Self
    where
        S: Scheduler + 'static,
        F: Fn() -> Outcome<T> + Send + Sync + 'static,
    {
        from_supplier(scheduler, supplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FutureError;
    use crate::scheduler::{DelayedScheduler, ImmediateScheduler};
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[rstest]
    #[tokio::test]
    async fn test_immediate_supplier_runs_on_get() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let future = Future::from_supplier(ImmediateScheduler, move || {
            Ok(counter.fetch_add(1, Ordering::SeqCst))
        });

        let computation = future.get();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(computation.await.ok(), Some(0));
    }

    #[rstest]
    #[tokio::test]
    async fn test_failing_supplier_rejects() {
        let future = from_supplier(ImmediateScheduler, || Err::<i32, _>(FutureError::msg("Error")));
        assert_eq!(future.get().await.unwrap_err().to_string(), "Error");
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_cancelled_delayed_supplier_never_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let future = from_supplier(DelayedScheduler::new(Duration::from_millis(50)), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let computation = future.get();
        computation.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

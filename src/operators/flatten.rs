use std::sync::Arc;

use crate::computation::Computation;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{CompositeSubscription, Subscription};

/// Joins a future of a future into a future of the inner value.
///
/// The outer future is invoked first; when it resolves, the inner future it
/// produced is invoked and its outcome adopted. A failure of either rejects
/// and cancels. Cancelling at any time cancels whichever of the two is
/// active; an outer failure means the inner future is never invoked.
///
/// # Examples
///
/// ```rust
/// use lazy_future::Future;
/// use lazy_future::operators::flatten;
/// use lazy_future::runtime::block_on;
///
/// let nested = Future::success(Future::success("A"));
/// assert_eq!(block_on(flatten(nested).get()).ok(), Some("A"));
/// ```
pub fn flatten<T>(future: Future<Future<T>>) -> Future<T>
where
    T: Send + 'static,
{
    Future::new(move || {
        let subscription = Arc::new(CompositeSubscription::new());
        let (settler, downstream) = Computation::pending(subscription.clone());

        let outer = future.get();
        let outer_handle = outer.subscription();
        subscription.add(outer_handle.clone());

        runtime::spawn(async move {
            let inner = match subscription.flag().until(outer).await {
                None => return,
                Some(Ok(inner)) => inner,
                Some(Err(error)) => {
                    settler.reject(error);
                    subscription.cancel();
                    return;
                }
            };
            subscription.remove(&outer_handle);
            if subscription.is_cancelled() {
                return;
            }

            let inner = inner.get();
            subscription.add(inner.subscription());
            match subscription.flag().until(inner).await {
                None => {}
                Some(Ok(value)) => {
                    settler.resolve(value);
                }
                Some(Err(error)) => {
                    settler.reject(error);
                    subscription.cancel();
                }
            }
        });

        downstream
    })
}

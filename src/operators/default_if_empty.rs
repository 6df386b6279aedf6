use std::sync::Arc;

use crate::computation::Computation;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{Subscription, WithUpstreamSubscription};

/// Substitutes `item` when the upstream resolves empty (`None`).
///
/// Present values pass through; failures propagate unchanged.
///
/// # Examples
///
/// ```rust
/// use lazy_future::Future;
/// use lazy_future::operators::default_if_empty;
/// use lazy_future::runtime::block_on;
///
/// let empty = Future::<Option<&str>>::success(None).compose(default_if_empty("X"));
/// assert_eq!(block_on(empty.get()).ok(), Some("X"));
///
/// let present = Future::success(Some("Y")).compose(default_if_empty("X"));
/// assert_eq!(block_on(present.get()).ok(), Some("Y"));
/// ```
pub fn default_if_empty<T>(item: T) -> impl FnOnce(Future<Option<T>>) -> Future<T>
where
    T: Clone + Send + Sync + 'static,
{
    move |upstream: Future<Option<T>>| {
        let item = Arc::new(item);

        Future::new(move || {
            let computation = upstream.get();
            let subscription =
                Arc::new(WithUpstreamSubscription::new(computation.subscription()));
            let (settler, downstream) = Computation::pending(subscription.clone());
            let item = Arc::clone(&item);

            runtime::spawn(async move {
                match subscription.flag().until(computation).await {
                    None => {}
                    Some(Ok(value)) => {
                        settler.resolve(value.unwrap_or_else(|| T::clone(&item)));
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
}

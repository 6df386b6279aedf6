use std::sync::Arc;

use crate::computation::Computation;
use crate::error::Outcome;
use crate::function::{Predicate2, same_value};
use crate::future::Future;
use crate::runtime;
use crate::subscription::{Subscription, WithUpstreamSubscription};

/// Resolves `true` if the upstream value equals `value`.
///
/// Equality is `PartialEq`; with an empty (`None`) upstream value and a
/// `Some` needle the result is `false`. Upstream failures pass through
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use lazy_future::Future;
/// use lazy_future::operators::contains;
/// use lazy_future::runtime::block_on;
///
/// let found = Future::success(5).compose(contains(5));
/// assert_eq!(block_on(found.get()).ok(), Some(true));
///
/// let missing = Future::success(3).compose(contains(5));
/// assert_eq!(block_on(missing.get()).ok(), Some(false));
/// ```
pub fn contains<A, B>(value: B) -> impl FnOnce(Future<A>) -> Future<bool>
where
    A: PartialEq<B> + Send + 'static,
    B: Send + Sync + 'static,
{
    move |upstream: Future<A>| contains_by(upstream, value, same_value())
}

/// Resolves with the result of `comparer(upstream_value, value)`.
///
/// An `Err` from the comparer rejects the computation and cancels the
/// upstream.
pub fn contains_with<A, B, F>(value: B, comparer: F) -> impl FnOnce(Future<A>) -> Future<bool>
where
    A: Send + 'static,
    B: Send + Sync + 'static,
    F: Fn(&A, &B) -> Outcome<bool> + Send + Sync + 'static,
{
    move |upstream: Future<A>| contains_by(upstream, value, Arc::new(comparer))
}

fn contains_by<A, B>(upstream: Future<A>, value: B, comparer: Predicate2<A, B>) -> Future<bool>
where
    A: Send + 'static,
    B: Send + Sync + 'static,
{
    let value = Arc::new(value);

    Future::new(move || {
        let computation = upstream.get();
        let subscription = Arc::new(WithUpstreamSubscription::new(computation.subscription()));
        let (settler, downstream) = Computation::pending(subscription.clone());
        let value = Arc::clone(&value);
        let comparer = Arc::clone(&comparer);

        runtime::spawn(async move {
            let Some(outcome) = subscription.flag().until(computation).await else {
                return;
            };
            match outcome.and_then(|resolved| comparer(&resolved, &value)) {
                Ok(found) => {
                    settler.resolve(found);
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

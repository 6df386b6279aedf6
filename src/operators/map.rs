use std::sync::Arc;

use crate::computation::Computation;
use crate::function::Function;
use crate::future::Future;
use crate::runtime;
use crate::subscription::{Subscription, WithUpstreamSubscription};

/// Transforms the resolved value with `mapper`; failures pass through.
pub fn map<A, B, F>(mapper: F) -> impl FnOnce(Future<A>) -> Future<B>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> B + Send + Sync + 'static,
{
    let mapper: Function<A, B> = Arc::new(mapper);

    move |upstream: Future<A>| {
        Future::new(move || {
            let computation = upstream.get();
            let subscription =
                Arc::new(WithUpstreamSubscription::new(computation.subscription()));
            let (settler, downstream) = Computation::pending(subscription.clone());
            let mapper = Arc::clone(&mapper);

            runtime::spawn(async move {
                match subscription.flag().until(computation).await {
                    None => {}
                    Some(Ok(value)) => {
                        settler.resolve(mapper(value));
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

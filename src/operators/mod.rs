//! Transformers and constructors built on the subscription protocol.
//!
//! Every transformer returns a closure `FnOnce(Future<A>) -> Future<B>` meant
//! for [`Future::compose`](crate::Future::compose). [`flatten`] is a free
//! function because it removes a level of nesting from the future itself.
//!
//! Each operator checks its own subscription immediately before delivering a
//! value or an error, so nothing is delivered once the downstream computation
//! has been cancelled.
//!
//! | Operator | Subscription |
//! |---|---|
//! | [`contains`], [`default_if_empty`], [`do_on_event`], [`do_on_failure`], [`do_on_success`], [`do_finally`], [`map`] | [`WithUpstreamSubscription`](crate::subscription::WithUpstreamSubscription) |
//! | [`switch_if_empty`], [`flatten`], [`retry`], [`retry_counted`] | [`CompositeSubscription`](crate::subscription::CompositeSubscription) |
//! | [`retry_timed`] | [`WithCallbacksSubscription`](crate::subscription::WithCallbacksSubscription) |
//! | [`from_external_handle`] | [`BooleanSubscription`](crate::subscription::BooleanSubscription) |

mod contains;
mod default_if_empty;
mod do_finally;
mod do_on_event;
mod do_on_failure;
mod do_on_success;
mod flatten;
mod from_external_handle;
mod from_supplier;
mod map;
mod retry;
mod retry_counted;
mod retry_timed;
mod switch_if_empty;

pub use contains::{contains, contains_with};
pub use default_if_empty::default_if_empty;
pub use do_finally::do_finally;
pub use do_on_event::do_on_event;
pub use do_on_failure::do_on_failure;
pub use do_on_success::do_on_success;
pub use flatten::flatten;
pub use from_external_handle::from_external_handle;
pub use from_supplier::from_supplier;
pub use map::map;
pub use retry::retry;
pub use retry_counted::retry_counted;
pub use retry_timed::{retry_timed, retry_timed_until};
pub use switch_if_empty::switch_if_empty;

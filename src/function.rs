//! Shared function types used by constructors, operators and schedulers.
//!
//! Callbacks are stored behind `Arc` so a [`Future`](crate::Future) can hand
//! the same callback to every invocation. Callbacks that may fail return
//! [`Outcome`]; an `Err` is treated as a failure raised by the callback.

use std::sync::Arc;

use crate::error::{FutureError, Outcome};

/// A zero-argument unit of work run by a [`Scheduler`](crate::scheduler::Scheduler).
pub type Action = Box<dyn FnOnce() -> Outcome<()> + Send>;

/// Produces a value on demand.
pub type Supplier<T> = Arc<dyn Fn() -> Outcome<T> + Send + Sync>;

/// Maps one value to another.
pub type Function<T, R> = Arc<dyn Fn(T) -> R + Send + Sync>;

/// Tests a single value.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Compares two values; may fail.
pub type Predicate2<A, B> = Arc<dyn Fn(&A, &B) -> Outcome<bool> + Send + Sync>;

/// Observes a value; may fail.
pub type Consumer<T> = Arc<dyn Fn(&T) -> Outcome<()> + Send + Sync>;

/// Observes whichever side of an outcome is present; may fail.
pub type Consumer2<A, B> = Arc<dyn Fn(Option<&A>, Option<&B>) -> Outcome<()> + Send + Sync>;

/// Side effect with no input; may fail.
pub type Finalizer = Arc<dyn Fn() -> Outcome<()> + Send + Sync>;

/// The default comparer for [`contains`](crate::operators::contains): plain
/// equality.
pub fn same_value<A, B>() -> Predicate2<A, B>
where
    A: PartialEq<B> + 'static,
    B: 'static,
{
    Arc::new(|left: &A, right: &B| Ok::<bool, FutureError>(left == right))
}

/// Wraps an infallible observer as a [`Consumer`].
pub fn infallible<T, F>(observer: F) -> Consumer<T>
where
    T: 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    Arc::new(move |value: &T| {
        observer(value);
        Ok::<(), FutureError>(())
    })
}

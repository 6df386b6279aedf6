//! # lazy-future
//!
//! Lazy, cancellable single-value futures with an explicit subscription
//! protocol.
//!
//! ## Overview
//!
//! A [`Future`] is an immutable description of deferred work. Nothing runs
//! until [`Future::get`] is called; every call starts an independent
//! [`Computation`] that settles at most once and carries the
//! [`Subscription`](subscription::Subscription) that cancels it. Once a
//! computation is cancelled, no value or error is delivered through it.
//!
//! - **Futures**: [`Future::success`], [`Future::failure`],
//!   [`Future::from_async`], [`Future::from_external_handle`],
//!   [`Future::from_supplier`]
//! - **Operators**: membership, empty handling, side effects, flattening
//!   and three retry policies in [`operators`]
//! - **Subscriptions**: the five cancellation shapes in [`subscription`]
//! - **Schedulers**: immediate and delayed execution in [`scheduler`]
//! - **Runtime**: where driver tasks run and how to wait from synchronous
//!   code, in [`runtime`]
//!
//! ## Feature Flags
//!
//! - `runtime` (default): a lazily-built multi-thread tokio runtime used
//!   when futures are started outside any tokio runtime.
//!
//! ## Example
//!
//! ```rust
//! use lazy_future::prelude::*;
//! use lazy_future::runtime::block_on;
//!
//! let answer = Future::<Option<i32>>::success(None)
//!     .compose(default_if_empty(42))
//!     .compose(retry_counted(2))
//!     .compose(contains(42));
//!
//! assert_eq!(block_on(answer.get()).ok(), Some(true));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports the future types and every operator.
///
/// # Usage
///
/// ```rust
/// use lazy_future::prelude::*;
/// ```
pub mod prelude {
    pub use crate::operators::*;
    pub use crate::subscription::Subscription;
    pub use crate::{Computation, CompositeError, Future, FutureError, Outcome, Transformer};
}

pub mod function;
pub mod operators;
pub mod runtime;
pub mod scheduler;
pub mod subscription;

mod computation;
mod error;
mod future;

pub use computation::{Computation, Settler};
pub use error::{BlockingError, CompositeError, FutureError, Outcome};
pub use future::{Future, Transformer};
pub use operators::flatten;

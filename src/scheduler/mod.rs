//! Policies deciding when and where an [`Action`] runs.
//!
//! A [`Scheduler`] turns a zero-argument action into a
//! [`Computation`](crate::Computation) that settles exactly once: resolved
//! when the action returns `Ok(())`, rejected with the action's error
//! otherwise.
//!
//! Two canonical schedulers are provided:
//!
//! - [`ImmediateScheduler`] runs the action synchronously inside
//!   [`schedule`](Scheduler::schedule); its computation cannot be cancelled.
//! - [`DelayedScheduler`] runs the action after a timer; cancelling before
//!   the delay elapses guarantees the action never runs.
//!
//! Any `Fn(Action) -> Computation<()>` closure is a scheduler too.
//!
//! # Examples
//!
//! ```rust
//! use lazy_future::scheduler::{ImmediateScheduler, Scheduler};
//! use lazy_future::runtime::block_on;
//!
//! let computation = ImmediateScheduler.schedule(Box::new(|| Ok(())));
//! assert!(block_on(computation).is_ok());
//! ```

mod delayed;
mod immediate;

pub use delayed::DelayedScheduler;
pub use immediate::ImmediateScheduler;

use crate::computation::Computation;
pub use crate::function::Action;

/// Turns an [`Action`] into a [`Computation`].
pub trait Scheduler: Send + Sync {
    /// Schedules `action` and returns the computation tracking it.
    fn schedule(&self, action: Action) -> Computation<()>;
}

impl<F> Scheduler for F
where
    F: Fn(Action) -> Computation<()> + Send + Sync,
{
    fn schedule(&self, action: Action) -> Computation<()> {
        self(action)
    }
}

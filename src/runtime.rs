//! Where operator driver tasks run.
//!
//! Operators settle their computations from small driver tasks that await
//! upstream computations. Those tasks are spawned on:
//!
//! 1. the tokio runtime the caller is currently inside, if any;
//! 2. otherwise a lazily-initialized multi-thread fallback runtime (the
//!    `runtime` feature, enabled by default), sized to the number of CPUs and
//!    never dropped.
//!
//! The module also offers [`block_on`] / [`try_block_on`] for waiting on a
//! [`Computation`](crate::Computation) from synchronous code.
//!
//! # Examples
//!
//! ```rust
//! use lazy_future::Future;
//! use lazy_future::runtime::block_on;
//!
//! let value = block_on(Future::success(21).get());
//! assert_eq!(value.ok(), Some(21));
//! ```

use std::future::Future as StdFuture;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;

pub use crate::error::BlockingError;

// =============================================================================
// Fallback Runtime
// =============================================================================

#[cfg(feature = "runtime")]
mod fallback {
    use std::cell::RefCell;
    use std::sync::LazyLock;

    use tokio::runtime::{Builder, Handle, Runtime};

    /// Fallback runtime initialized lazily on first access.
    static GLOBAL_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
        tracing::debug!(workers = num_cpus::get(), "starting fallback runtime");
        Builder::new_multi_thread()
            .worker_threads(num_cpus::get())
            .thread_name("lazy-future-worker")
            .enable_all()
            .build()
            .expect("Failed to create fallback tokio runtime")
    });

    thread_local! {
        static CACHED_HANDLE: RefCell<Option<Handle>> = const { RefCell::new(None) };
    }

    pub(super) fn global() -> &'static Runtime {
        &GLOBAL_RUNTIME
    }

    pub(super) fn cached_handle() -> Handle {
        CACHED_HANDLE.with(|cached| {
            cached
                .borrow_mut()
                .get_or_insert_with(|| global().handle().clone())
                .clone()
        })
    }
}

/// Returns the fallback runtime.
///
/// The runtime is created on first call and shared by every thread.
#[cfg(feature = "runtime")]
#[inline]
#[must_use]
pub fn global() -> &'static tokio::runtime::Runtime {
    fallback::global()
}

// =============================================================================
// Handles
// =============================================================================

/// Returns a handle to the current runtime, or to the fallback runtime when
/// called from outside any runtime.
///
/// # Panics
///
/// Without the `runtime` feature, panics when called outside a tokio
/// runtime.
#[inline]
#[must_use]
pub fn handle() -> Handle {
    if let Ok(current_handle) = Handle::try_current() {
        return current_handle;
    }
    #[cfg(feature = "runtime")]
    {
        fallback::cached_handle()
    }
    #[cfg(not(feature = "runtime"))]
    {
        Handle::current()
    }
}

/// Spawns an operator driver task.
pub(crate) fn spawn<F>(task: F) -> JoinHandle<()>
where
    F: StdFuture<Output = ()> + Send + 'static,
{
    handle().spawn(task)
}

// =============================================================================
// Blocking Wait
// =============================================================================

/// Waits for `future` from synchronous code, blocking the current thread.
///
/// - Inside a multi-thread runtime: uses `block_in_place` on the current
///   runtime.
/// - Inside a current-thread runtime: returns
///   `Err(BlockingError::CurrentThreadRuntime)`.
/// - Outside any runtime: blocks on the fallback runtime, or returns
///   `Err(BlockingError::NoRuntime)` without the `runtime` feature.
///
/// Waiting on a computation that gets cancelled blocks forever.
///
/// # Errors
///
/// Returns a [`BlockingError`] when the current thread cannot be blocked.
#[inline]
pub fn try_block_on<F, T>(future: F) -> Result<T, BlockingError>
where
    F: StdFuture<Output = T>,
{
    if let Ok(current_handle) = Handle::try_current() {
        match current_handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => Ok(tokio::task::block_in_place(|| {
                current_handle.block_on(future)
            })),
            RuntimeFlavor::CurrentThread => Err(BlockingError::CurrentThreadRuntime),
            _ => Err(BlockingError::UnsupportedRuntimeFlavor),
        }
    } else {
        #[cfg(feature = "runtime")]
        {
            Ok(global().block_on(future))
        }
        #[cfg(not(feature = "runtime"))]
        {
            drop(future);
            Err(BlockingError::NoRuntime)
        }
    }
}

/// Waits for `future` from synchronous code.
///
/// # Panics
///
/// Panics where [`try_block_on`] would return an error.
#[inline]
pub fn block_on<F, T>(future: F) -> T
where
    F: StdFuture<Output = T>,
{
    try_block_on(future).expect("block_on failed")
}

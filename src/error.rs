//! Error types for lazy futures.
//!
//! Failures travel through a pipeline as [`FutureError`] values. Upstream
//! failures are passed along unchanged, errors returned by user callbacks are
//! ordinary `FutureError`s as well, and the two are combined into a
//! [`CompositeError`] whenever a callback fails while a failure is already
//! being reported.
//!
//! # Examples
//!
//! ```rust
//! use lazy_future::{CompositeError, FutureError};
//!
//! let original = FutureError::msg("connection reset");
//! let callback = FutureError::msg("log sink closed");
//! let composite = FutureError::from(CompositeError::new(original, callback));
//!
//! assert_eq!(composite.to_string(), r#"["connection reset","log sink closed"]"#);
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Shorthand for the settled result of a [`Computation`](crate::Computation).
pub type Outcome<T> = Result<T, FutureError>;

// =============================================================================
// FutureError
// =============================================================================

/// The failure side of every [`Computation`](crate::Computation).
///
/// `FutureError` is cheap to clone: a [`Future`](crate::Future) may be
/// invoked many times, and leaves such as [`Future::failure`](crate::Future::failure)
/// reject every invocation with the same error.
#[derive(Debug, Clone)]
pub enum FutureError {
    /// A failure described only by a message.
    Message(Arc<str>),
    /// A failure carrying an arbitrary error value.
    Source(Arc<dyn Error + Send + Sync>),
    /// Two causally related failures, see [`CompositeError`].
    Composite(Arc<CompositeError>),
}

impl FutureError {
    /// Creates a failure from a message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazy_future::FutureError;
    ///
    /// let error = FutureError::msg("boom");
    /// assert_eq!(error.to_string(), "boom");
    /// ```
    pub fn msg(message: impl Into<Arc<str>>) -> Self {
        Self::Message(message.into())
    }

    /// Wraps any error value.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Source(Arc::new(error))
    }

    /// Returns the composite failure if this error is one.
    pub fn as_composite(&self) -> Option<&CompositeError> {
        match self {
            Self::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// Returns `true` if this error wraps two failures.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}

impl fmt::Display for FutureError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => formatter.write_str(message),
            Self::Source(source) => write!(formatter, "{source}"),
            Self::Composite(composite) => write!(formatter, "{composite}"),
        }
    }
}

impl Error for FutureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Message(_) => None,
            Self::Source(source) => Some(source.as_ref()),
            Self::Composite(composite) => Some(composite.as_ref()),
        }
    }
}

impl From<CompositeError> for FutureError {
    fn from(composite: CompositeError) -> Self {
        Self::Composite(Arc::new(composite))
    }
}

impl From<&str> for FutureError {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

impl From<String> for FutureError {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

// =============================================================================
// CompositeError
// =============================================================================

/// Two failures that happened one after the other.
///
/// The `original` is the failure that was being reported; the `secondary` is
/// the failure raised by a callback while handling it. Neither is dropped.
///
/// The display form lists both messages in order, e.g. `["Error","Error"]`.
#[derive(Debug, Clone)]
pub struct CompositeError {
    original: FutureError,
    secondary: FutureError,
}

impl CompositeError {
    /// Combines an original failure with the failure that followed it.
    pub const fn new(original: FutureError, secondary: FutureError) -> Self {
        Self {
            original,
            secondary,
        }
    }

    /// The failure that was being reported.
    pub const fn original(&self) -> &FutureError {
        &self.original
    }

    /// The failure raised while handling [`original`](Self::original).
    pub const fn secondary(&self) -> &FutureError {
        &self.secondary
    }

    /// Both failures, original first.
    pub fn errors(&self) -> [&FutureError; 2] {
        [&self.original, &self.secondary]
    }
}

impl fmt::Display for CompositeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "[{:?},{:?}]",
            self.original.to_string(),
            self.secondary.to_string()
        )
    }
}

impl Error for CompositeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.original)
    }
}

// =============================================================================
// Blocking Error
// =============================================================================

/// Error type for waiting on a computation from synchronous code.
///
/// Returned by [`try_block_on`](crate::runtime::try_block_on) when the
/// calling thread cannot be blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingError {
    /// Cannot use `block_in_place` in a current-thread runtime.
    CurrentThreadRuntime,

    /// The runtime flavor is not supported for blocking execution.
    UnsupportedRuntimeFlavor,

    /// No runtime is running and the fallback runtime is disabled.
    NoRuntime,
}

impl fmt::Display for BlockingError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentThreadRuntime => {
                write!(
                    formatter,
                    "cannot block in current-thread runtime: \
                     block_in_place is only supported in multi-thread runtimes"
                )
            }
            Self::UnsupportedRuntimeFlavor => {
                write!(
                    formatter,
                    "cannot block: the runtime flavor is not supported for blocking execution"
                )
            }
            Self::NoRuntime => {
                write!(
                    formatter,
                    "cannot block: no tokio runtime is running and the `runtime` feature is disabled"
                )
            }
        }
    }
}

impl Error for BlockingError {}
